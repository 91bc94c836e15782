mod cli;
mod db;
mod error;
mod export;
mod fmt;
mod ingest;
mod mapping;
mod models;
mod reports;
mod settings;
mod store;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import { file, month, year } => cli::import::run(&file, &month, year),
        Commands::Records => cli::records::run(),
        Commands::Summary { month, year } => cli::summary::run(month.as_deref(), year),
        Commands::Export {
            month,
            year,
            output,
        } => cli::export::run(&month, year, output.as_deref()),
        Commands::Mapping => cli::mapping::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
