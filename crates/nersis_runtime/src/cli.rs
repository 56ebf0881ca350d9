//! Command-line arguments
//!
//! Everything here overrides the settings file, which in turn overrides the
//! built-in defaults.

use std::path::PathBuf;

use clap::Parser;
use nersis_services::settings::{Settings, Variant};

/// Scriptable graphics runtime
#[derive(Parser, Debug)]
#[command(name = "nersis", version, about = "Scriptable graphics runtime")]
pub struct CliArgs {
    /// Entry script, run before the first frame
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render offscreen without opening a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after N frames
    #[arg(long, value_name = "N")]
    pub max_frames: Option<u64>,
}

impl CliArgs {
    pub fn apply(self, settings: &mut Settings) {
        if let Some(script) = self.script {
            settings.script.entry = Some(script);
        }
        if self.headless {
            settings.graphics.variant = Variant::Headless;
        }
        if self.max_frames.is_some() {
            settings.script.max_frames = self.max_frames;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("nersis").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn script_and_config_are_separate() {
        let args = parse(&["game.js", "--config", "nersis.json"]);
        assert_eq!(args.script, Some(PathBuf::from("game.js")));
        assert_eq!(args.config, Some(PathBuf::from("nersis.json")));
    }

    #[test]
    fn overrides_apply_on_top_of_settings() {
        let mut settings = Settings::default();
        settings.script.max_frames = Some(10);
        parse(&["--headless", "main.js"]).apply(&mut settings);

        assert_eq!(settings.graphics.variant, Variant::Headless);
        assert_eq!(settings.script.entry, Some(PathBuf::from("main.js")));
        assert_eq!(settings.script.max_frames, Some(10));
    }

    #[test]
    fn help_and_unknown_flags_are_not_paths() {
        let help = CliArgs::try_parse_from(["nersis", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(CliArgs::try_parse_from(["nersis", "--bogus"]).is_err());
    }
}
