use clap::Parser;
use homerow_bin::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = homerow_bin::run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
