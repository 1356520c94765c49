//! Grid tokens: two-character codes like `A1`, `X9` or `85`.

use crate::BreachError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leading characters of a letter token
pub const LETTERS: [u8; 6] = *b"ACEFX8";
/// Digits used in both token positions
pub const DIGITS: [u8; 9] = *b"123456789";
/// Probability that a generated token is letter+digit rather than digit+digit
pub const LETTER_PROBABILITY: f64 = 0.75;

/// A single grid token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token([u8; 2]);

impl Token {
    /// Build a token from its two characters
    pub fn new(lead: char, digit: char) -> Result<Self, BreachError> {
        let invalid = || BreachError::InvalidToken(format!("{lead}{digit}"));
        let lead = u8::try_from(lead).map_err(|_| invalid())?;
        let digit = u8::try_from(digit).map_err(|_| invalid())?;

        let lead_ok = LETTERS.contains(&lead) || DIGITS.contains(&lead);
        if !lead_ok || !DIGITS.contains(&digit) {
            return Err(invalid());
        }
        Ok(Self([lead, digit]))
    }

    /// Draw a random token: letter+digit with probability 0.75, else digit+digit
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let lead = if rng.gen_bool(LETTER_PROBABILITY) {
            LETTERS[rng.gen_range(0..LETTERS.len())]
        } else {
            DIGITS[rng.gen_range(0..DIGITS.len())]
        };
        let digit = DIGITS[rng.gen_range(0..DIGITS.len())];
        Self([lead, digit])
    }

    /// Whether the token starts with a letter
    pub fn is_letter(&self) -> bool {
        // '8' is in both sets; treat it as a letter like the alphabet does
        LETTERS.contains(&self.0[0])
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

impl FromStr for Token {
    type Err = BreachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(lead), Some(digit), None) => Self::new(lead, digit),
            _ => Err(BreachError::InvalidToken(s.to_string())),
        }
    }
}

impl TryFrom<String> for Token {
    type Error = BreachError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.to_string()
    }
}
