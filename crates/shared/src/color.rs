use serde::{Deserialize, Serialize};

/// Errors when parsing a color string
#[derive(Debug, Clone, PartialEq)]
pub enum ColorError {
    /// Not a `#rgb`, `#rrggbb` or `#rrggbbaa` literal or known name
    InvalidFormat(String),
    /// Non-hex digit inside a hex literal
    InvalidDigit(String),
}

impl std::fmt::Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorError::InvalidFormat(s) => write!(f, "Invalid color format: '{}'", s),
            ColorError::InvalidDigit(s) => write!(f, "Invalid hex digit in color: '{}'", s),
        }
    }
}

impl std::error::Error for ColorError {}

/// 8-bit RGBA color, serialized as a `#rrggbbaa` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Default annotation color
    pub const SKY: Color = Color::rgb(0x00, 0xbb, 0xff);
    /// Default dot fill
    pub const LIGHT_GREEN: Color = Color::rgb(0x90, 0xee, 0x90);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or one of a few CSS color names
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        if let Some(named) = Self::named(trimmed) {
            return Ok(named);
        }

        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorError::InvalidFormat(s.to_string()))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(s.to_string()));
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);

        let parsed = match hex.len() {
            3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
            6 => (byte(0), byte(2), byte(4), Ok(255)),
            8 => (byte(0), byte(2), byte(4), byte(6)),
            _ => return Err(ColorError::InvalidFormat(s.to_string())),
        };

        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self { r, g, b, a }),
            _ => Err(ColorError::InvalidDigit(s.to_string())),
        }
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "pink" => Self::rgb(255, 192, 203),
            "greenyellow" => Self::rgb(173, 255, 47),
            "lightgreen" => Self::LIGHT_GREEN,
            _ => return None,
        };
        Some(color)
    }

    /// `#rrggbbaa` form
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::SKY
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl std::str::FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}
