//! Config validation CLI tool
//!
//! Validates a mrfoods configuration file and reports any errors.

use mrfoods_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a mrfoods configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match mrfoods_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", mrfoods_config::CURRENT_CONFIG_VERSION);
            println!("  Storage: {:?} ({})", settings.storage.backend, settings.storage.data_dir.display());
            println!(
                "  Orders complete after: {}",
                mrfoods_util::format_duration(settings.orders.completion_after)
            );
            println!(
                "  Sweep interval: {}",
                mrfoods_util::format_duration(settings.orders.sweep_interval)
            );
            println!("  Password storage: {:?}", settings.accounts.password_storage);
            println!("  Menu: {} dishes", settings.catalog.len());

            for category in settings.catalog.categories() {
                println!();
                println!("  {} [{}]", category.name, category.id);
                for item in &category.items {
                    println!(
                        "    - {:>3} {}: {}",
                        item.id,
                        item.name,
                        settings.display.format_price(item.price)
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                mrfoods_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                mrfoods_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                mrfoods_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                mrfoods_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        mrfoods_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
