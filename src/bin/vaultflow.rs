use clap::Parser;
use vaultflow::app::{self, Cli};

fn main() {
    let cli = Cli::parse();
    app::init_tracing();
    if let Err(err) = app::run_cli(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
