use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use pidcat_types::{Connection, Severity};

/// pidcat - adb logcat filtered to the processes of chosen packages
#[derive(Parser, Debug)]
#[command(name = "pidcat")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("connection")
        .required(true)
        .args(["serial", "device", "emulator"])
))]
pub struct Args {
    /// Display messages from all packages
    #[arg(short = 'a', long, conflicts_with_all = ["packages", "current"])]
    pub all: bool,

    /// Filter by the app currently in the foreground
    #[arg(long)]
    pub current: bool,

    /// Application package name(s)
    #[arg(short = 'p', long = "package", value_name = "PACKAGE", value_delimiter = ',')]
    pub packages: Vec<String>,

    /// List third party package names and exit
    #[arg(long)]
    pub list_packages: bool,

    /// List all package names and exit
    #[arg(long)]
    pub list_all_packages: bool,

    /// Device serial number (adb -s)
    #[arg(short = 's', long, value_name = "SERIAL")]
    pub serial: Option<String>,

    /// Use the first device (adb -d)
    #[arg(short = 'd', long)]
    pub device: bool,

    /// Use the first emulator (adb -e)
    #[arg(short = 'e', long)]
    pub emulator: bool,

    /// Path to the adb binary
    #[arg(long, value_name = "PATH")]
    pub adb_path: Option<String>,

    /// Minimum log level to be displayed (V, D, I, W, E, F, S)
    #[arg(short = 'l', long, value_name = "LEVEL")]
    pub min_level: Option<Severity>,

    /// Clear the log before running
    #[arg(short = 'c', long)]
    pub clear: bool,

    /// Only show these tag(s)
    #[arg(short = 'm', long = "match-tag", value_name = "TAG", value_delimiter = ',')]
    pub match_tags: Vec<String>,

    /// Ignore these tag(s)
    #[arg(short = 'f', long = "filter-tag", value_name = "TAG", value_delimiter = ',')]
    pub filter_tags: Vec<String>,

    /// Also write entries to this file (level:tag:message)
    #[arg(short = 'L', long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Settings file (defaults to <config dir>/pidcat/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Device selected by -s, -d or -e
    pub fn connection(&self) -> Connection {
        match (&self.serial, self.device) {
            (Some(serial), _) => Connection::Serial(serial.clone()),
            (None, true) => Connection::Device,
            (None, false) => Connection::Emulator,
        }
    }

    /// Whether this run only lists packages
    pub fn listing(&self) -> Option<bool> {
        if self.list_packages {
            Some(true)
        } else if self.list_all_packages {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("pidcat").chain(args.iter().copied()))
    }

    #[test]
    fn test_connection_is_required() {
        assert!(parse(&["-p", "com.example.app"]).is_err());
    }

    #[test]
    fn test_connections_are_exclusive() {
        assert!(parse(&["-d", "-e", "-a"]).is_err());
        assert!(parse(&["-s", "abc", "-d", "-a"]).is_err());
    }

    #[test]
    fn test_connection_selection() {
        assert_eq!(parse(&["-d", "-a"]).unwrap().connection(), Connection::Device);
        assert_eq!(parse(&["-e", "-a"]).unwrap().connection(), Connection::Emulator);
        assert_eq!(
            parse(&["-s", "emulator-5554", "-a"]).unwrap().connection(),
            Connection::Serial("emulator-5554".into())
        );
    }

    #[test]
    fn test_packages_comma_delimited_and_repeatable() {
        let args = parse(&["-d", "-p", "com.a,com.b", "--package", "com.c"]).unwrap();
        assert_eq!(args.packages, vec!["com.a", "com.b", "com.c"]);
    }

    #[test]
    fn test_min_level_case_insensitive() {
        let args = parse(&["-d", "-a", "-l", "w"]).unwrap();
        assert_eq!(args.min_level, Some(Severity::Warning));
    }

    #[test]
    fn test_invalid_min_level_rejected() {
        let err = parse(&["-d", "-a", "-l", "loud"]).unwrap_err();
        assert!(err.to_string().contains("invalid level"));
    }

    #[test]
    fn test_tag_lists() {
        let args = parse(&["-d", "-a", "-m", "A,B", "-f", "Noisy", "-f", "Chatty"]).unwrap();
        assert_eq!(args.match_tags, vec!["A", "B"]);
        assert_eq!(args.filter_tags, vec!["Noisy", "Chatty"]);
    }

    #[test]
    fn test_all_excludes_package_selection() {
        assert!(parse(&["-d", "-a", "-p", "com.example.app"]).is_err());
        assert!(parse(&["-d", "-a", "--current"]).is_err());
        assert!(parse(&["-d", "-a"]).is_ok());
    }

    #[test]
    fn test_listing_mode() {
        assert_eq!(parse(&["-d", "--list-packages"]).unwrap().listing(), Some(true));
        assert_eq!(parse(&["-d", "--list-all-packages"]).unwrap().listing(), Some(false));
        assert_eq!(parse(&["-d", "-a"]).unwrap().listing(), None);
    }
}
