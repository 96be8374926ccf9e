// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sysrgb")]
#[command(author, version, about = "Per-key RGB keyboard control through the kernel LED class")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/sysrgb/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// LED class directory, overrides the config file
    #[arg(long, global = true, value_name = "DIR")]
    pub leds_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Profiles ===
    /// Save the current colors to a profile file (.txt, .ini or .json)
    #[command(visible_alias = "s")]
    Save {
        /// Output file
        path: PathBuf,
    },

    /// Restore colors from a profile file
    #[command(visible_alias = "l")]
    Load {
        /// Profile file
        path: PathBuf,
    },

    // === Animations ===
    /// Run an animation until Ctrl+C
    #[command(visible_aliases = ["anim", "a"])]
    Animate {
        /// Animation type
        #[arg(long = "type", short = 't', value_enum)]
        kind: AnimationType,

        /// Pulse target
        #[arg(long, value_enum, default_value_t = AnimateTarget::Keyboard)]
        target: AnimateTarget,

        /// Key to pulse when --target key
        #[arg(long)]
        key_name: Option<String>,

        /// Base color for pulse (#rrggbb, r,g,b or a name)
        #[arg(long)]
        color: Option<String>,

        /// Tick interval in milliseconds (default from config)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,

        /// Keys to draw from for random (default: all keys)
        #[arg(long = "key", short = 'k')]
        keys: Vec<String>,
    },

    // === Direct control ===
    /// Set a key or group to a color
    #[command(visible_alias = "c")]
    Set {
        /// Key name, "keyboard" or "lightbar"
        target: String,
        /// Color (#rrggbb, r,g,b or a name)
        color: String,
    },

    /// Show or set brightness
    #[command(visible_aliases = ["bright", "b"])]
    Brightness {
        /// "keyboard", "lightbar" or a key with a brightness node
        #[arg(default_value = "keyboard")]
        target: String,
        /// New value; omit to show the current one
        value: Option<u8>,
    },

    /// Give keys one random color each
    #[command(visible_alias = "r")]
    Randomize {
        /// Keys or groups (default: all keys)
        keys: Vec<String>,
    },

    // === Info ===
    /// List key names by row
    #[command(visible_alias = "k")]
    Keys,

    /// Show LED node status
    #[command(visible_alias = "i")]
    Info,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum AnimationType {
    /// Random colors on random keys
    Random,
    /// Rainbow wave across the columns
    Wave,
    /// Brightness pulse on one target
    Pulse,
}

impl AnimationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationType::Random => "random",
            AnimationType::Wave => "wave",
            AnimationType::Pulse => "pulse",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum AnimateTarget {
    /// Aggregate keyboard backlight
    #[default]
    Keyboard,
    /// Lightbar
    Lightbar,
    /// Single key, named by --key-name
    Key,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_animate() {
        let cli = Cli::try_parse_from([
            "sysrgb", "animate", "--type", "pulse", "--target", "key", "--key-name", "F5",
            "--color", "#00ff00", "--interval-ms", "50",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Animate {
                kind,
                target,
                key_name,
                color,
                interval_ms,
                keys,
            }) => {
                assert!(kind == AnimationType::Pulse);
                assert!(target == AnimateTarget::Key);
                assert_eq!(key_name.as_deref(), Some("F5"));
                assert_eq!(color.as_deref(), Some("#00ff00"));
                assert_eq!(interval_ms, Some(50));
                assert!(keys.is_empty());
            }
            _ => panic!("expected animate"),
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Cli::try_parse_from(["sysrgb", "animate", "-t", "wave", "--interval-ms", "0"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli =
            Cli::try_parse_from(["sysrgb", "set", "Esc", "red", "-v", "--leds-root", "/tmp/x"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.leds_root, Some(PathBuf::from("/tmp/x")));
    }
}
