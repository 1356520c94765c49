use breach_core::Token;
use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub bg: Color,
    pub fg: Color,
    /// Digit-lead tokens such as `55`
    pub numeric: Color,
    pub border: Color,
    /// Cursor background
    pub selected_bg: Color,
    /// Cells the next pick may use
    pub allowed_bg: Color,
    /// Cells outside the constraint
    pub locked: Color,
    /// Cells holding the focused objective token
    pub focus_bg: Color,
    /// Matched objective tokens
    pub done: Color,
    pub error: Color,
    pub success: Color,
    pub info: Color,
    /// Key binding text, hover highlight
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub const COUNT: usize = 3;

    /// Theme by position in the cycle: dark, light, high contrast
    pub fn by_index(index: usize) -> Self {
        match index % Self::COUNT {
            0 => Self::dark(),
            1 => Self::light(),
            _ => Self::high_contrast(),
        }
    }

    /// Resting color of a grid token
    pub fn token_fg(&self, token: Token) -> Color {
        if token.is_letter() {
            self.fg
        } else {
            self.numeric
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "Dark",
            bg: Color::Rgb { r: 12, g: 16, b: 14 },
            fg: Color::Rgb { r: 205, g: 235, b: 210 },
            numeric: Color::Rgb { r: 140, g: 200, b: 230 },
            border: Color::Rgb { r: 60, g: 85, b: 70 },
            selected_bg: Color::Rgb { r: 40, g: 110, b: 80 },
            allowed_bg: Color::Rgb { r: 28, g: 46, b: 38 },
            locked: Color::Rgb { r: 80, g: 95, b: 88 },
            focus_bg: Color::Rgb { r: 90, g: 70, b: 20 },
            done: Color::Rgb { r: 90, g: 255, b: 150 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 150, g: 170, b: 160 },
            key: Color::Rgb { r: 230, g: 220, b: 90 },
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light",
            bg: Color::Rgb { r: 246, g: 248, b: 244 },
            fg: Color::Rgb { r: 25, g: 35, b: 30 },
            numeric: Color::Rgb { r: 30, g: 90, b: 150 },
            border: Color::Rgb { r: 170, g: 185, b: 175 },
            selected_bg: Color::Rgb { r: 170, g: 220, b: 190 },
            allowed_bg: Color::Rgb { r: 222, g: 236, b: 226 },
            locked: Color::Rgb { r: 160, g: 168, b: 162 },
            focus_bg: Color::Rgb { r: 250, g: 225, b: 150 },
            done: Color::Rgb { r: 20, g: 140, b: 70 },
            error: Color::Rgb { r: 210, g: 45, b: 45 },
            success: Color::Rgb { r: 30, g: 150, b: 60 },
            info: Color::Rgb { r: 85, g: 95, b: 90 },
            key: Color::Rgb { r: 180, g: 110, b: 10 },
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            name: "High contrast",
            bg: Color::Black,
            fg: Color::White,
            numeric: Color::Cyan,
            border: Color::Grey,
            selected_bg: Color::Blue,
            allowed_bg: Color::Rgb { r: 35, g: 35, b: 35 },
            locked: Color::DarkGrey,
            focus_bg: Color::DarkYellow,
            done: Color::Green,
            error: Color::Red,
            success: Color::Green,
            info: Color::Grey,
            key: Color::Yellow,
        }
    }
}
