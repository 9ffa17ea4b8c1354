use std::io;
use std::path::PathBuf;

use socrates::cli;
use socrates::config::Config;
use socrates::db::SqlitePersistence;
use socrates::ops::EventStoreGateway;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut args = std::env::args().skip(1);
    let mut command_args = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" | "-f" => match args.next() {
                Some(path) => config.db_path = PathBuf::from(path),
                None => {
                    eprintln!("Error: --file requires a path argument");
                    std::process::exit(1);
                }
            },
            "--help" | "-h" => {
                command_args = vec!["help".to_string()];
                break;
            }
            _ => command_args.push(arg),
        }
    }

    let command = match cli::parse(&command_args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if command == cli::Command::Help {
        if let Err(e) = cli::print_help(&mut io::stdout()) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error creating {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    let persistence = match SqlitePersistence::open(&config.db_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(db = %config.db_path.display(), "database opened");

    let gateway = EventStoreGateway::new(persistence);
    if let Err(e) = cli::execute(&gateway, config.save_attempts, command, &mut io::stdout()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
