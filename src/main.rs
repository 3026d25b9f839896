use std::process::ExitCode;

fn main() -> ExitCode {
    drone_skip_pipeline::run_from_args(std::env::args_os())
}
