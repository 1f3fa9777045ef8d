use log::info;
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub const BEARER_TOKEN_VAR: &str = "SCHEDULER_BEARER_AUTH_TOKEN";
pub const LOG_LEVEL_VAR: &str = "SCHEDULER_LOG_LEVEL";
pub const CONFIG_PATH_VAR: &str = "SCHEDULER_CONFIG_PATH";
pub const API_BASE_VAR: &str = "SCHEDULER_API_BASE";

pub const REQUIRED_ENV_VARS: &[&str] = &[BEARER_TOKEN_VAR];

// Names of optional environment variables
pub const OPTIONAL_ENV_VARS: &[&str] = &[LOG_LEVEL_VAR, CONFIG_PATH_VAR, API_BASE_VAR];

/// Names of required variables that are unset or blank
pub fn missing_env_vars() -> Vec<&'static str> {
    REQUIRED_ENV_VARS
        .iter()
        .copied()
        .filter(|var| !matches!(env::var(var), Ok(val) if !val.trim().is_empty()))
        .collect()
}

pub fn check_env_vars() -> bool {
    let missing = missing_env_vars();
    for var in &missing {
        println!("❌ Missing required environment variable: {}", var);
    }
    missing.is_empty()
}

pub fn load_env_file() -> io::Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            info!("Loaded environment from {:?}", path);
            Ok(())
        }
        Err(e) => {
            info!("No .env file found or error loading it: {}", e);
            create_env_template(Path::new(".env"))
        }
    }
}

fn create_env_template(env_path: &Path) -> io::Result<()> {
    // Don't overwrite existing .env file
    if env_path.exists() {
        return Ok(());
    }

    let mut file = File::create(env_path)?;

    for var in REQUIRED_ENV_VARS {
        writeln!(file, "{}=", var)?;
    }

    for var in OPTIONAL_ENV_VARS {
        writeln!(file, "# {}=", var)?;
    }

    Ok(())
}
