use std::process::ExitCode;

fn main() -> ExitCode {
    plancast_cli::run()
}
