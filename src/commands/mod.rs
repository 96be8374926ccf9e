//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `profile`: Profile files (save, load)
//! - `set`: Direct writes (set, brightness, randomize)
//! - `animations`: Background animations (animate)
//! - `query`: Read-only commands (keys, info)

pub mod animations;
pub mod profile;
pub mod query;
pub mod set;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use sysrgb::{Config, KeyboardError, KeyboardState, PlatformTable, Rgb, SysfsBackend};
use sysrgb_keyboard::WriteFailure;
use tracing::{debug, warn};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Settings every command needs
pub struct Session {
    pub config: Config,
    pub leds_root: PathBuf,
}

impl Session {
    /// Merge the config file with command-line overrides
    pub fn new(config: Config, leds_root: Option<PathBuf>) -> Self {
        let leds_root = leds_root
            .or_else(|| config.leds_root.clone())
            .unwrap_or_else(|| PlatformTable::default().leds_root);
        Self { config, leds_root }
    }

    /// Build the key registry over the sysfs LED nodes. A missing driver is fatal.
    pub fn open_keyboard(&self) -> anyhow::Result<Arc<KeyboardState>> {
        let table = PlatformTable::with_leds_root(&self.leds_root);
        let backend = SysfsBackend::new(&self.leds_root);
        let state = KeyboardState::open(&table, &backend)?;
        debug!("keyboard opened under {}", backend.root().display());
        Ok(Arc::new(state))
    }
}

/// Parse a user-supplied color
pub fn parse_color(s: &str) -> anyhow::Result<Rgb> {
    s.parse::<Rgb>()
        .with_context(|| format!("invalid color {s:?} (use #rrggbb, r,g,b or a name)"))
}

/// Print which keys failed to write
pub fn print_failures(failures: &[WriteFailure]) {
    eprintln!("{} writes failed:", failures.len());
    for failure in failures {
        eprintln!("  {failure}");
    }
    if failures.iter().any(|f| f.error.is_permission_denied()) {
        eprintln!("LED nodes are not writable by this user; try again as root");
    }
    if failures.iter().any(|f| f.error.is_not_found()) {
        eprintln!("some LED nodes disappeared; check that the driver is still loaded");
    }
}

/// Turn a write error into the command outcome: a group write that reached
/// at least one node prints its failures and succeeds, anything else fails.
pub fn finish_write(result: Result<(), KeyboardError>) -> CommandResult {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_partial() => {
            if let KeyboardError::GroupWrite { target, failures, .. } = &e {
                eprintln!("{target}: partially applied");
                print_failures(failures);
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Warn when not running as root; sysfs LED nodes are normally root-writable only
pub fn check_privileges() {
    // SAFETY: geteuid has no preconditions and cannot fail
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        warn!("running as uid {euid}; writing LED nodes usually requires root");
    }
}

/// Set up a Ctrl-C handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    if let Err(e) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    }) {
        warn!("failed to install Ctrl-C handler: {e}");
    }

    running
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysrgb::MemoryBackend;

    #[test]
    fn test_session_root_precedence() {
        let config = Config {
            leds_root: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };
        let s = Session::new(config.clone(), Some(PathBuf::from("/from/flag")));
        assert_eq!(s.leds_root, PathBuf::from("/from/flag"));
        let s = Session::new(config, None);
        assert_eq!(s.leds_root, PathBuf::from("/from/config"));
        let s = Session::new(Config::default(), None);
        assert_eq!(s.leds_root, PathBuf::from("/sys/class/leds"));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0000").unwrap(), Rgb::RED);
        assert_eq!(parse_color("0,0,255").unwrap(), Rgb::BLUE);
        assert!(parse_color("chartreuse-ish").is_err());
    }

    fn memory_keyboard() -> (MemoryBackend, KeyboardState) {
        let backend = MemoryBackend::new();
        let keyboard = KeyboardState::open(&PlatformTable::default(), &backend).unwrap();
        (backend, keyboard)
    }

    #[test]
    fn test_finish_write_policy() {
        assert!(finish_write(Ok(())).is_ok());
        assert!(finish_write(Err(KeyboardError::UnknownKey("x".into()))).is_err());
    }

    #[test]
    fn test_partial_group_write_succeeds() {
        let (backend, keyboard) = memory_keyboard();
        backend
            .channel("rgb:kbd_backlight_110")
            .unwrap()
            .set_fail_writes(true);
        let target = keyboard.resolve("keyboard").unwrap();
        assert!(finish_write(keyboard.set_color(&target, Rgb::RED)).is_ok());
    }

    #[test]
    fn test_group_write_reaching_no_node_fails() {
        let (backend, keyboard) = memory_keyboard();
        backend
            .channel("rgb:lightbar")
            .unwrap()
            .set_fail_writes(true);
        let target = keyboard.resolve("lightbar").unwrap();
        let err = finish_write(keyboard.set_color(&target, Rgb::RED)).unwrap_err();
        assert!(err.to_string().contains("1 of 1 writes failed"), "{err}");
    }
}
