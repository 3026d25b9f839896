pub mod changeset;
pub mod config;
pub mod decision;
pub mod rules;
pub mod signal;

pub(crate) mod cli;

/// Run the plugin once: validate settings, fetch the change set, decide, and
/// return the exit status to terminate with.
///
/// Settings are taken as already parsed; the binary goes through
/// [`run_from_args`]. Library callers wanting the decision
/// without side effects should use [`rules::RuleSet`] and [`decision::decide`]
/// directly.
pub fn run_plugin(settings: config::Settings) -> std::process::ExitCode {
    cli::run::run(settings)
}

/// Parse arguments (falling back to the environment) and run the plugin.
///
/// Argument errors are reported as one diagnostic line and exit with
/// [`signal::FAILURE_STATUS`].
pub fn run_from_args<I, T>(args: I) -> std::process::ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    cli::run::run_from_args(args)
}
