use camlatch_core::ControlId;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "camlatch",
    version,
    about = "Pin a USB camera's image controls and verify they latched"
)]
pub struct Cli {
    #[command(flatten)]
    pub flags: Flags,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Inputs that shape the run configuration.
#[derive(Args, Debug, Default)]
pub struct Flags {
    /// Pixel format for the capture side: mjpg or yuyv
    #[arg(long, default_value = "mjpg", global = true)]
    pub mode: String,

    /// Absolute exposure (20-10000); defaults to the profile's value
    #[arg(long, allow_negative_numbers = true, global = true)]
    pub exposure: Option<i64>,

    /// Bounce the exposure register if it did not latch
    #[arg(long, global = true)]
    pub fix: bool,

    /// USB vendor id of the target camera (hex)
    #[arg(long, global = true)]
    pub vendor: Option<String>,

    /// USB model id of the target camera (hex)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Device profile TOML; defaults to the built-in 1bcf:0b09 profile
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Configure, verify and hand the camera to capture (default)
    Apply,
    /// List video capture devices and their USB ids
    List,
    /// Show the target camera's current control values
    Show {
        /// Include auto-mode switches, not just image controls
        #[arg(long)]
        all: bool,

        /// Only these controls, by profile key (e.g. gamma exposure)
        controls: Vec<ControlId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["camlatch"]).unwrap();
        assert_eq!(cli.flags.mode, "mjpg");
        assert_eq!(cli.flags.exposure, None);
        assert!(!cli.flags.fix);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "camlatch", "--mode", "yuyv", "--exposure", "1000", "--fix", "--vendor", "058f",
        ])
        .unwrap();
        assert_eq!(cli.flags.mode, "yuyv");
        assert_eq!(cli.flags.exposure, Some(1000));
        assert!(cli.flags.fix);
        assert_eq!(cli.flags.vendor.as_deref(), Some("058f"));
    }

    #[test]
    fn test_negative_exposure_reaches_validation() {
        let cli = Cli::try_parse_from(["camlatch", "--exposure", "-5"]).unwrap();
        assert_eq!(cli.flags.exposure, Some(-5));
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["camlatch", "show", "--all", "--json"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Show {
                all: true,
                controls: Vec::new()
            })
        );
        assert!(cli.json);

        let cli = Cli::try_parse_from(["camlatch", "show", "gamma", "auto_exposure"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Show {
                all: false,
                controls: vec![ControlId::Gamma, ControlId::AutoExposure]
            })
        );

        let err = Cli::try_parse_from(["camlatch", "show", "focus"]).unwrap_err();
        assert!(err.to_string().contains("unknown control: focus"));

        let cli = Cli::try_parse_from(["camlatch", "list"]).unwrap();
        assert_eq!(cli.command, Some(Commands::List));
    }
}
