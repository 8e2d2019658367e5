use clap::Parser;

use lessondeck::cli::Cli;
use lessondeck::telemetry;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    if !telemetry::init_tracing(cli.verbose, cli.quiet, !cli.no_color) {
        eprintln!("tracing subscriber already installed");
    }

    cli.run()
}
