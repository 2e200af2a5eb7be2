use clap::Parser;
use signalsim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
