use clap::Parser;
use std::ffi::OsString;

/// Runs mix and rewrites app-relative paths in umbrella projects.
///
/// mixpath has no options of its own: every argument, including `--help` and
/// `--version`, is handed to the wrapped tool untouched. Configure the wrapper
/// through `MIXPATH_*` environment variables instead.
#[derive(Parser, Debug)]
#[command(
    name = "mixpath",
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Arguments for the wrapped tool
    #[arg(
        value_name = "ARGS",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub tool_args: Vec<OsString>,
}

impl CliArgs {
    /// Parses the raw process arguments (program name first).
    ///
    /// clap consumes a leading `--` as its own escape marker; it is put back
    /// so the tool sees exactly what the wrapper was given.
    pub fn parse_forwarded<I, T>(raw: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let raw: Vec<OsString> = raw.into_iter().map(Into::into).collect();
        let mut args = Self::parse_from(&raw);

        if raw.get(1).map(|a| a == "--").unwrap_or(false) {
            args.tool_args.insert(0, OsString::from("--"));
        }

        args
    }
}
