// JSON profiles
// {"keys": [{"key": "Esc", "color": "#ff0000"}, {"key": "keyboard", "color": "#0a141e", "brightness": 40}]}

use serde::{Deserialize, Serialize};
use sysrgb_keyboard::{Profile, Rgb};

use super::{Decoded, ParseWarning, ProfileCodec, ProfileError};

#[derive(Debug, Serialize, Deserialize)]
struct JsonProfile {
    keys: Vec<JsonEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonEntry {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    brightness: Option<u8>,
}

pub struct JsonCodec;

impl ProfileCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, profile: &Profile) -> Result<String, ProfileError> {
        let doc = JsonProfile {
            keys: profile
                .iter()
                .map(|e| JsonEntry {
                    key: e.key.clone(),
                    color: e.color.map(Rgb::to_hex),
                    brightness: e.brightness,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn decode(&self, input: &str) -> Result<Decoded, ProfileError> {
        let doc: JsonProfile = serde_json::from_str(input)?;
        let mut decoded = Decoded::default();
        for (idx, entry) in doc.keys.into_iter().enumerate() {
            let pos = idx + 1;
            let key = entry.key.trim();
            if key.is_empty() {
                decoded.warnings.push(ParseWarning::new(pos, "missing key name"));
                continue;
            }
            if let Some(value) = &entry.color {
                match Rgb::parse(value) {
                    Some(color) => decoded.profile.set_color(key, color),
                    None => {
                        decoded.warnings.push(ParseWarning::new(
                            pos,
                            format!("{key}: invalid color {value:?}"),
                        ));
                        continue;
                    }
                }
            }
            if let Some(b) = entry.brightness {
                decoded.profile.set_brightness(key, b);
            }
        }
        Ok(decoded)
    }
}
