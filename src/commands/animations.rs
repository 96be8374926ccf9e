//! Animation command handlers.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::bail;
use sysrgb::{Animation, AnimationEngine, Config};
use tracing::info;

use super::{parse_color, setup_interrupt_handler, CommandResult, Session};
use crate::cli::{AnimateTarget, AnimationType};

/// Options of the animate command
pub struct AnimateArgs {
    pub kind: AnimationType,
    pub target: AnimateTarget,
    pub key_name: Option<String>,
    pub color: Option<String>,
    pub interval_ms: Option<u64>,
    pub keys: Vec<String>,
}

/// Turn command-line options into an animation, config values as defaults
pub fn build_animation(config: &Config, args: &AnimateArgs) -> anyhow::Result<Animation> {
    let interval = args.interval_ms.map(Duration::from_millis);
    let animation = match args.kind {
        AnimationType::Random => {
            let mut params = config.random.clone();
            if !args.keys.is_empty() {
                params.keys = args.keys.clone();
            }
            params.interval = interval.unwrap_or(params.interval);
            Animation::Random(params)
        }
        AnimationType::Wave => {
            let mut params = config.wave.clone();
            params.interval = interval.unwrap_or(params.interval);
            Animation::Wave(params)
        }
        AnimationType::Pulse => {
            let mut params = config.pulse.clone();
            params.target = match args.target {
                AnimateTarget::Keyboard => "keyboard".to_string(),
                AnimateTarget::Lightbar => "lightbar".to_string(),
                AnimateTarget::Key => match &args.key_name {
                    Some(name) => name.clone(),
                    None => bail!("--target key needs --key-name"),
                },
            };
            if let Some(color) = &args.color {
                params.color = Some(parse_color(color)?);
            }
            params.interval = interval.unwrap_or(params.interval);
            Animation::Pulse(params)
        }
    };
    Ok(animation)
}

/// Run an animation until Ctrl+C, then stop it and return
pub fn animate(session: &Session, args: &AnimateArgs) -> CommandResult {
    let animation = build_animation(&session.config, args)?;
    let keyboard = session.open_keyboard()?;
    let engine = AnimationEngine::new(Arc::clone(&keyboard));

    let running = setup_interrupt_handler();
    engine.start(animation)?;
    println!("Running {} animation (Ctrl+C to stop)...", args.kind.as_str());

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    if let Some(stats) = engine.stop() {
        info!("{} ticks, {} with write errors", stats.ticks(), stats.errors());
    }
    println!("\nStopped.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: AnimationType) -> AnimateArgs {
        AnimateArgs {
            kind,
            target: AnimateTarget::Keyboard,
            key_name: None,
            color: None,
            interval_ms: None,
            keys: Vec::new(),
        }
    }

    #[test]
    fn test_interval_overrides_config() {
        let config = Config::default();
        let mut a = args(AnimationType::Wave);
        a.interval_ms = Some(40);
        match build_animation(&config, &a).unwrap() {
            Animation::Wave(p) => assert_eq!(p.interval, Duration::from_millis(40)),
            other => panic!("unexpected {other:?}"),
        }
        match build_animation(&config, &args(AnimationType::Random)).unwrap() {
            Animation::Random(p) => assert_eq!(p.interval, Duration::from_millis(500)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_pulse_target_selection() {
        let config = Config::default();
        let mut a = args(AnimationType::Pulse);
        a.target = AnimateTarget::Key;
        assert!(build_animation(&config, &a).is_err());

        a.key_name = Some("F5".into());
        a.color = Some("red".into());
        match build_animation(&config, &a).unwrap() {
            Animation::Pulse(p) => {
                assert_eq!(p.target, "F5");
                assert_eq!(p.color, Some(sysrgb::Rgb::RED));
            }
            other => panic!("unexpected {other:?}"),
        }

        a.target = AnimateTarget::Lightbar;
        match build_animation(&config, &a).unwrap() {
            Animation::Pulse(p) => assert_eq!(p.target, "lightbar"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
