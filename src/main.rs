use clap::Parser;
use log::{warn, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod viewer;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Err(e) = viewer::run_viewer(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if e.is_configuration() {
            eprintln!("Check the --config file and the command line overrides.");
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
