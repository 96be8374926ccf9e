//! Common types for the LED channel layer

use std::fmt;
use std::str::FromStr;

/// Single 8-bit brightness intensity, a separate axis from [`Rgb`]
pub type Brightness = u8;

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Black (all LEDs off)
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
    /// White (all LEDs full)
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Red
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
    /// Green
    pub const GREEN: Self = Self { r: 0, g: 255, b: 0 };
    /// Blue
    pub const BLUE: Self = Self { r: 0, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from HSV (h: 0-360, s: 0-1, v: 0-1).
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.rem_euclid(360.0);
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let c = v * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match (h / 60.0) as i32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self {
            r: ((r + m) * 255.0).round() as u8,
            g: ((g + m) * 255.0).round() as u8,
            b: ((b + m) * 255.0).round() as u8,
        }
    }

    /// Parse a color string: "#RRGGBB", "r,g,b", "r g b", "red", "green", etc.
    ///
    /// Decimal components above 255 are clamped.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                return Some(Self::new(r, g, b));
            }
            return None;
        }
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            return Self::parse_components(s);
        }
        match s.to_ascii_lowercase().as_str() {
            "black" | "off" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::new(255, 255, 0)),
            "cyan" => Some(Self::new(0, 255, 255)),
            "magenta" | "pink" => Some(Self::new(255, 0, 255)),
            "orange" => Some(Self::new(255, 165, 0)),
            "purple" => Some(Self::new(128, 0, 255)),
            _ => None,
        }
    }

    /// Parse exactly three decimal components separated by commas and/or whitespace.
    pub fn parse_components(s: &str) -> Option<Self> {
        let mut parts = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let mut next = || -> Option<u8> {
            let v: u32 = parts.next()?.parse().ok()?;
            Some(v.min(255) as u8)
        };
        let color = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return None;
        }
        Some(color)
    }

    /// Format as "#rrggbb"
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a string is not a recognised color
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?} (expected #rrggbb, r,g,b or a color name)")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// Static description of one LED node from the platform table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    /// Node name under the LED class directory (e.g. `rgb:kbd_backlight_42`)
    pub name: String,
    /// Whether this node is expected to expose a brightness control
    pub brightness: bool,
    /// Upper brightness bound enforced regardless of what the driver reports
    pub max_brightness: Option<Brightness>,
}

impl NodeSpec {
    /// Color-only node
    pub fn color_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brightness: false,
            max_brightness: None,
        }
    }

    /// Node with color and brightness controls
    pub fn with_brightness(name: impl Into<String>, max_brightness: Option<Brightness>) -> Self {
        Self {
            name: name.into(),
            brightness: true,
            max_brightness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hsv_primaries() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::from_hsv(120.0, 1.0, 1.0), Rgb::GREEN);
        assert_eq!(Rgb::from_hsv(240.0, 1.0, 1.0), Rgb::BLUE);
        assert_eq!(Rgb::from_hsv(360.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::from_hsv(-120.0, 1.0, 1.0), Rgb::BLUE);
        assert_eq!(Rgb::from_hsv(0.0, 0.0, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 0.0), Rgb::BLACK);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse("#ff8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::parse("#FF8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::parse("#ff80"), None);
        assert_eq!(Rgb::parse("#gg0000"), None);
    }

    #[test]
    fn test_parse_components() {
        assert_eq!(Rgb::parse("1,2,3"), Some(Rgb::new(1, 2, 3)));
        assert_eq!(Rgb::parse("1 2 3"), Some(Rgb::new(1, 2, 3)));
        assert_eq!(Rgb::parse(" 10, 20 ,30 "), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse("300,0,0"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse("1,2"), None);
        assert_eq!(Rgb::parse("1,2,3,4"), None);
        assert_eq!(Rgb::parse("1,x,3"), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Rgb::parse("Red"), Some(Rgb::RED));
        assert_eq!(Rgb::parse("off"), Some(Rgb::BLACK));
        assert_eq!(Rgb::parse("chartreuse"), None);
    }

    #[test]
    fn test_display_and_from_str() {
        let c = Rgb::new(0x12, 0xab, 0x00);
        assert_eq!(c.to_string(), "#12ab00");
        assert_eq!(c.to_hex(), "#12ab00");
        assert_eq!("#12ab00".parse::<Rgb>(), Ok(c));
        assert!("nope".parse::<Rgb>().is_err());
    }
}
