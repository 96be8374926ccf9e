//! Set (write) command handlers.

use sysrgb::color::random_color;

use super::{finish_write, parse_color, CommandResult, Session};

/// Set a key or group to one color
pub fn set(session: &Session, target: &str, color: &str) -> CommandResult {
    let color = parse_color(color)?;
    let keyboard = session.open_keyboard()?;
    let target = keyboard.resolve(target)?;
    finish_write(keyboard.set_color(&target, color))?;
    println!("{} set to {color}", target.label());
    Ok(())
}

/// Show brightness, or set it when a value is given
pub fn brightness(session: &Session, target: &str, value: Option<u8>) -> CommandResult {
    let keyboard = session.open_keyboard()?;
    let target = keyboard.resolve(target)?;

    match value {
        Some(value) => {
            finish_write(keyboard.set_brightness(&target, value))?;
            println!("{} brightness set to {value}", target.label());
        }
        None => {
            let Some(max) = keyboard.max_brightness(&target) else {
                println!("{} has no brightness control", target.label());
                return Ok(());
            };
            let current = target
                .keys()
                .iter()
                .find_map(|&id| keyboard.brightness(id))
                .unwrap_or(0);
            println!("{} brightness: {current}/{max}", target.label());
        }
    }
    Ok(())
}

/// One random color per key
pub fn randomize(session: &Session, names: &[String]) -> CommandResult {
    let keyboard = session.open_keyboard()?;
    let registry = keyboard.registry();

    let mut ids = Vec::new();
    if names.is_empty() {
        ids.extend(registry.layout_keys().map(|k| k.id()));
    } else {
        for name in names {
            for &id in registry.resolve(name)?.keys() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }

    let mut rng = rand::rng();
    let frame: Vec<_> = ids.iter().map(|&id| (id, random_color(&mut rng))).collect();
    finish_write(keyboard.set_colors("randomize", &frame))?;
    println!("Randomized {} keys", frame.len());
    Ok(())
}
