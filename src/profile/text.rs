//! `Key = color` lines
//!
//! ```text
//! # comment
//! keyboard = #0a141e
//! keyboard.brightness = 25
//! Esc = #ff0000
//! Space = 0,0,255
//! ```

use sysrgb_keyboard::{Profile, Rgb};

use super::{Decoded, ParseWarning, ProfileCodec, ProfileError};

const BRIGHTNESS_SUFFIX: &str = ".brightness";

pub struct TextCodec;

impl ProfileCodec for TextCodec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn encode(&self, profile: &Profile) -> Result<String, ProfileError> {
        let mut out = String::from("# sysrgb profile\n");
        for entry in profile.iter() {
            if let Some(color) = entry.color {
                out.push_str(&format!("{} = {}\n", entry.key, color));
            }
            if let Some(b) = entry.brightness {
                out.push_str(&format!("{}{} = {}\n", entry.key, BRIGHTNESS_SUFFIX, b));
            }
        }
        Ok(out)
    }

    fn decode(&self, input: &str) -> Result<Decoded, ProfileError> {
        let mut decoded = Decoded::default();
        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                decoded
                    .warnings
                    .push(ParseWarning::new(line_no, format!("expected `key = color`: {line}")));
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                decoded.warnings.push(ParseWarning::new(line_no, "missing key name"));
                continue;
            }

            if let Some(name) = key.strip_suffix(BRIGHTNESS_SUFFIX) {
                match value.parse::<u8>() {
                    Ok(b) if !name.is_empty() => decoded.profile.set_brightness(name, b),
                    Ok(_) => decoded.warnings.push(ParseWarning::new(line_no, "missing key name")),
                    Err(_) => decoded.warnings.push(ParseWarning::new(
                        line_no,
                        format!("{name}: invalid brightness {value:?}"),
                    )),
                }
                continue;
            }

            match Rgb::parse(value) {
                Some(color) => decoded.profile.set_color(key, color),
                None => decoded.warnings.push(ParseWarning::new(
                    line_no,
                    format!("{key}: invalid color {value:?}"),
                )),
            }
        }
        Ok(decoded)
    }
}
