use stderrlog::{LogLevelNum, Timestamp};

/// Logging options, given before the subcommand
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence all log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log more (-v warnings, -vv info, -vvv compile steps, -vvvv every construct)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Prefix log lines with a timestamp
    #[arg(short, long)]
    pub ts: bool,
}

impl LogArgs {
    /// Install the stderr logger; errors are shown unless quiet
    pub fn setup_logging(&self) -> Result<(), log::SetLoggerError> {
        let verbosity = match self.verbose {
            0 => LogLevelNum::Error,
            1 => LogLevelNum::Warn,
            2 => LogLevelNum::Info,
            3 => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        };

        stderrlog::new()
            .module("regx_core")
            .module(module_path!())
            .quiet(self.quiet)
            .verbosity(verbosity)
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()
    }
}
