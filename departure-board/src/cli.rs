use std::path::PathBuf;

use clap::Parser;

/// Kiosk departure board for National Rail stations.
/// Rotates through the configured stations and their platforms, showing the
/// next departures from each.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration document.
    /// A sample is written beside it if it is missing or invalid.
    #[arg(long, short = 'c', value_name = "PATH", default_value = "config.json")]
    pub config: PathBuf,

    /// Append logs to this file instead of standard error
    #[arg(long, short = 'l', value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Serve fixture departures even if the config turns test mode off
    #[arg(long, short = 't')]
    pub test_mode: bool,

    /// Do not highlight delayed departures with terminal colours
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["departure-board"]);
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert!(args.log_file.is_none());
        assert!(!args.test_mode);
        assert!(!args.no_color);
    }

    #[test]
    fn all_flags() {
        let args = Args::parse_from([
            "departure-board",
            "--config",
            "/etc/board/configmk2.json",
            "--log-file",
            "board.log",
            "--test-mode",
            "--no-color",
        ]);
        assert_eq!(args.config, PathBuf::from("/etc/board/configmk2.json"));
        assert_eq!(args.log_file, Some(PathBuf::from("board.log")));
        assert!(args.test_mode);
        assert!(args.no_color);
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
