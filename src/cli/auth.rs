//! `auth` and `deauth` subcommands.

use std::error::Error;
use std::io::{self, BufRead, Write};

use crate::core::constants::API_KEY_ENV_VARS;
use crate::core::credentials::{delete_api_key, store_api_key};

pub fn run_auth() -> Result<(), Box<dyn Error>> {
    println!("🔐 Gemini API key setup");
    println!("Keys are stored in the system keyring. Environment variables");
    println!("({}) take precedence when set.", API_KEY_ENV_VARS.join(", "));
    print!("Enter your API key: ");
    io::stdout().flush()?;

    let mut key = String::new();
    io::stdin().lock().read_line(&mut key)?;
    let key = key.trim();
    if key.is_empty() {
        return Err("No key entered; nothing was stored.".into());
    }

    store_api_key(key)?;
    println!("✅ API key stored.");
    Ok(())
}

pub fn run_deauth() -> Result<(), Box<dyn Error>> {
    if delete_api_key()? {
        println!("✅ Stored API key removed.");
    } else {
        println!("No stored API key to remove.");
    }
    Ok(())
}
