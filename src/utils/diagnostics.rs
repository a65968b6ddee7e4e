use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";
const DEBUG_FILTER: &str = "warn,genui_chat=debug";

fn build_filter(debug_log: bool) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_log {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    }
}

/// Installs the global tracing subscriber. Diagnostics go to stderr unless a
/// debug log file is given, which also raises this crate to `debug`.
/// `RUST_LOG` overrides either default.
pub fn init_tracing(debug_log: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(debug_log.is_some()))
        .with_target(false);

    match debug_log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e.to_string())?;
        }
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e.to_string())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_log_raises_crate_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert_eq!(build_filter(false).to_string(), DEFAULT_FILTER);
        assert!(build_filter(true).to_string().contains("genui_chat=debug"));
    }
}
