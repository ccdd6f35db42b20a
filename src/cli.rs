use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub file: Option<String>,
    pub interactive: bool,
    pub pretty: bool,
    pub verbose: u8,
}

pub fn command() -> Command {
    Command::new("xbasic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("An interpreter for the XBasic scripting language")
        .arg(
            Arg::new("file")
                .help("The .bsx script to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start the interactive shell (after FILE, if given)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Render diagnostics with labelled source snippets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more (-v debug, -vv trace); XBASIC_LOG overrides")
                .action(ArgAction::Count),
        )
}

impl CliArgs {
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        command()
            .try_get_matches_from(args)
            .map(|matches| Self::from_matches(&matches))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            file: matches.get_one::<String>("file").cloned(),
            interactive: matches.get_flag("interactive"),
            pretty: matches.get_flag("pretty"),
            verbose: matches.get_count("verbose"),
        }
    }

    /// The shell runs when asked for, or when there is nothing else to do.
    pub fn wants_shell(&self) -> bool {
        self.interactive || self.file.is_none()
    }

    /// Log filter used when `XBASIC_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Scripts must carry the `.bsx` extension.
pub fn check_script_path(path: &str) -> Result<(), String> {
    if path.ends_with(".bsx") {
        Ok(())
    } else {
        Err("Error: File must end with '.bsx'.".to_string())
    }
}
