//! Query (read-only) command handlers.

use sysrgb_keyboard::Group;

use super::{CommandResult, Session};

/// List key names row by row, as they sit on the keyboard
pub fn keys(session: &Session) -> CommandResult {
    let keyboard = session.open_keyboard()?;
    let registry = keyboard.registry();

    let mut rows: Vec<Vec<&str>> = Vec::new();
    for key in registry.layout_keys() {
        let Some(row) = key.row() else { continue };
        if rows.len() <= row {
            rows.resize_with(row + 1, Vec::new);
        }
        rows[row].push(key.name());
    }
    for (idx, names) in rows.iter().enumerate() {
        println!("Row {idx}: {}", names.join(" "));
    }
    println!(
        "Groups: {}, {}",
        Group::Keyboard.name(),
        Group::Lightbar.name()
    );
    Ok(())
}

/// Show LED node presence and the cached state of the zone nodes
pub fn info(session: &Session) -> CommandResult {
    let keyboard = session.open_keyboard()?;
    let registry = keyboard.registry();

    let total = registry.channels().count();
    let present = registry.channels().filter(|c| c.present).count();
    println!("LED root:  {}", registry.leds_root().display());
    println!("Nodes:     {present}/{total} present");
    println!("Keys:      {}", registry.layout_keys().count());

    for key in [registry.keyboard_key(), registry.lightbar_key()] {
        let channel = registry.channel_of(key.id());
        if !channel.present {
            println!("{:<10} {} (missing)", key.name(), channel.node);
            continue;
        }
        let brightness = match (keyboard.brightness(key.id()), channel.max_brightness) {
            (Some(b), Some(max)) => format!("{b}/{max}"),
            _ => "-".to_string(),
        };
        println!(
            "{:<10} {} color {} brightness {}",
            key.name(),
            channel.node,
            keyboard.color(key.id()),
            brightness
        );
    }

    let missing: Vec<&str> = registry
        .channels()
        .filter(|c| !c.present)
        .map(|c| c.node.as_str())
        .collect();
    if !missing.is_empty() {
        println!("Missing:   {}", missing.join(", "));
    }
    Ok(())
}
