use crate::config::{config_path, FileConfig, APP_NAME, KEYRING_USER};
use anyhow::{Context, Result};
use keyring::Entry;
use log::warn;
use std::io::{self, Write};

const DEFAULT_ENDPOINT: &str = "https://api.sumologic.com/api/v1/";

struct Answers {
    endpoint: String,
    access_id: String,
    access_key: String,
    time_zone: Option<String>,
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Saves the key in the OS keyring and reads it back through a fresh entry.
/// Only a key that comes back unchanged counts as stored.
fn store_in_keyring(access_key: &str) -> bool {
    if let Err(e) = Entry::new(APP_NAME, KEYRING_USER).and_then(|e| e.set_password(access_key)) {
        warn!("Could not write access key to keyring: {}", e);
        return false;
    }
    match Entry::new(APP_NAME, KEYRING_USER).and_then(|e| e.get_password()) {
        Ok(read_back) => read_back == access_key,
        Err(e) => {
            warn!("Access key did not persist in keyring: {}", e);
            false
        }
    }
}

fn apply_answers(
    file_config: &mut FileConfig,
    answers: Answers,
    store_key: impl FnOnce(&str) -> bool,
) {
    file_config.endpoint = Some(answers.endpoint);
    file_config.access_id = Some(answers.access_id);
    // An old pre-encoded token would shadow the pair just entered
    file_config.token = None;
    if let Some(time_zone) = answers.time_zone {
        file_config.time_zone = Some(time_zone);
    }

    if store_key(&answers.access_key) {
        file_config.access_key = None;
    } else {
        warn!("Keyring unavailable, storing access key in config file");
        file_config.access_key = Some(answers.access_key);
    }
}

pub fn run() -> Result<()> {
    println!("Welcome to the sumosearch configuration wizard!");
    println!("Access keys are created under Administration > Security > Access Keys.");
    println!();

    // 1. Endpoint, defaulting to the US1 deployment
    let endpoint = prompt(&format!("Enter API endpoint [{}]: ", DEFAULT_ENDPOINT))?;
    let endpoint = if endpoint.is_empty() {
        DEFAULT_ENDPOINT.to_string()
    } else {
        endpoint
    };
    url::Url::parse(&endpoint).context(format!("'{}' is not a valid URL", endpoint))?;

    // 2. Access id
    let access_id = prompt("Enter Access ID: ")?;

    // 3. Access key
    print!("Enter Access Key (hidden): ");
    io::stdout().flush()?;
    let access_key = rpassword::read_password()?.trim().to_string();

    // 4. Time zone
    let time_zone = prompt("Time zone for searches [UTC]: ")?;

    println!();
    println!("Saving configuration...");

    let config_path = config_path().context("Could not determine configuration directory.")?;
    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut file_config = FileConfig::read_or_default(&config_path)?;
    let answers = Answers {
        endpoint,
        access_id,
        access_key,
        time_zone: Some(time_zone).filter(|tz| !tz.is_empty()),
    };
    apply_answers(&mut file_config, answers, store_in_keyring);

    let toml_string = toml::to_string(&file_config)?;
    std::fs::write(&config_path, toml_string)?;
    println!("Configuration saved to: {}", config_path.display());
    println!();
    println!("You can now run 'sumosearch search <query>'.");

    println!("Setup complete!");
    Ok(())
}
