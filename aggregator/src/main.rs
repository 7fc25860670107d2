//! Data Aggregation API - Entry Point
//!
//! Periodically rebuilds the OpenConfig tree of every device in the network
//! inventory and serves the last successful result over HTTP.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use daa::app::options::AppOptions;
use daa::app::run::run;
use daa::filesys::file::File;
use daa::logs::{init_logging, LogOptions};
use daa::storage::settings::Settings;
use daa::utils::version_info;

use tracing::{error, info};

const CONFIG_ENV: &str = "DAA_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "/etc/data-aggregation-api/settings.json";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Unable to print version: {}", e),
        }
        return;
    }

    // Retrieve the settings file
    let settings_file = File::new(config_path(&cli_args));
    let settings = match Settings::load(&settings_file).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log.level.clone(),
        json_format: settings.log.json,
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    info!(
        "Data aggregation API {} ({}), built {} by {}",
        version.version, version.git_hash, version.build_time, version.build_user
    );

    // Run the service
    let options = AppOptions::from_settings(&settings);
    info!("Running with options: {:?}", options);
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Failed to run the service: {e}");
        std::process::exit(1);
    }
}

fn config_path(cli_args: &HashMap<String, String>) -> PathBuf {
    if let Some(path) = cli_args.get("config") {
        return PathBuf::from(path);
    }
    match env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Unable to install signal handlers, waiting for Ctrl+C only");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}
