//! INI profiles: one section per key
//!
//! ```ini
//! [Esc]
//! color = 255,0,0
//!
//! [keyboard]
//! color = 10,20,30
//! brightness = 40
//! ```

use sysrgb_keyboard::{Profile, Rgb};

use super::{Decoded, ParseWarning, ProfileCodec, ProfileError};

pub struct IniCodec;

impl ProfileCodec for IniCodec {
    fn name(&self) -> &'static str {
        "ini"
    }

    fn encode(&self, profile: &Profile) -> Result<String, ProfileError> {
        let mut sections = Vec::with_capacity(profile.len());
        for entry in profile.iter() {
            let mut section = format!("[{}]\n", entry.key);
            if let Some(c) = entry.color {
                section.push_str(&format!("color = {},{},{}\n", c.r, c.g, c.b));
            }
            if let Some(b) = entry.brightness {
                section.push_str(&format!("brightness = {b}\n"));
            }
            sections.push(section);
        }
        Ok(sections.join("\n"))
    }

    fn decode(&self, input: &str) -> Result<Decoded, ProfileError> {
        let mut decoded = Decoded::default();
        let mut section: Option<String> = None;

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                if name.is_empty() {
                    decoded.warnings.push(ParseWarning::new(line_no, "empty section name"));
                    section = None;
                } else {
                    section = Some(name.to_string());
                }
                continue;
            }

            let Some(key) = section.as_deref() else {
                decoded
                    .warnings
                    .push(ParseWarning::new(line_no, "option outside of a key section"));
                continue;
            };
            let Some((option, value)) = line.split_once(['=', ':']) else {
                decoded
                    .warnings
                    .push(ParseWarning::new(line_no, format!("[{key}] expected `option = value`")));
                continue;
            };
            let value = value.trim();
            match option.trim().to_ascii_lowercase().as_str() {
                "color" => match Rgb::parse_components(value) {
                    Some(color) => decoded.profile.set_color(key, color),
                    None => decoded.warnings.push(ParseWarning::new(
                        line_no,
                        format!("[{key}] invalid color {value:?}"),
                    )),
                },
                "brightness" => match value.parse::<u8>() {
                    Ok(b) => decoded.profile.set_brightness(key, b),
                    Err(_) => decoded.warnings.push(ParseWarning::new(
                        line_no,
                        format!("[{key}] invalid brightness {value:?}"),
                    )),
                },
                other => decoded.warnings.push(ParseWarning::new(
                    line_no,
                    format!("[{key}] unknown option {other:?}"),
                )),
            }
        }
        Ok(decoded)
    }
}
