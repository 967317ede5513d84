//! CLI tool for issuing license keys from a stored generator
//!
//! Usage:
//!   generate-license-keys --generator-id <id> [--count <n>] [--config <path>] [--json]
//!
//! Options:
//!   --generator-id  Id of the generator to draw keys from
//!   --count         Number of distinct keys to produce (default: 1)
//!   --config        Path to configuration file
//!   --json          Print the keys with their limits as JSON
//!   --verbose       Enable verbose output

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use license_manager::{db, db::GeneratorRepository, services::LicenseKeyGenerator, AppConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut generator_id: Option<i64> = None;
    let mut count: usize = 1;
    let mut json = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--generator-id" => {
                if i + 1 < args.len() {
                    generator_id = Some(
                        args[i + 1]
                            .parse()
                            .with_context(|| format!("Invalid generator id: {}", args[i + 1]))?,
                    );
                    i += 1;
                }
            }
            "--count" => {
                if i + 1 < args.len() {
                    count = args[i + 1]
                        .parse()
                        .with_context(|| format!("Invalid count: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--json" => {
                json = true;
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(generator_id) = generator_id else {
        print_help();
        bail!("--generator-id is required");
    };
    if count == 0 {
        bail!("--count must be at least 1");
    }

    // Logs go to stderr so stdout carries only the keys
    let log_level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::load_from(config_path.as_ref())?;

    let pool = db::init_pool(&config.database)
        .await
        .context("Failed to open database")?;
    info!("Connected to database: {}", config.database.url);

    let generator = GeneratorRepository::new(&pool).find(generator_id).await?;
    info!(generator_id, name = %generator.name, count, "Generating license keys");

    let keys = LicenseKeyGenerator::new(&generator)?.generate(count)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&keys)?);
    } else {
        for key in &keys {
            println!("{}", key.license_key);
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"generate-license-keys - Issue license keys from a stored generator

USAGE:
    generate-license-keys --generator-id <ID> [OPTIONS]

OPTIONS:
    --generator-id <ID>  Generator to draw keys from
    --count <N>          Number of distinct keys to produce (default: 1)
    --config <PATH>      Path to configuration file
    --json               Print keys with expiry and activation limit as JSON
    -v, --verbose        Enable verbose output
    -h, --help           Print this help message

EXAMPLE:
    generate-license-keys --generator-id 3 --count 10"#
    );
}
