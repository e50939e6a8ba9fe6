pub mod config;
pub mod doctor;

use clap::{Parser, Subcommand};

/// Handover — operator console for human-agent chat handoff.
#[derive(Debug, Parser)]
#[command(name = "handover", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the console API server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `HO_CONFIG` (or
/// `config.toml` by default).  Returns the parsed config and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(ho_domain::Config, String)> {
    let config_path = std::env::var("HO_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        ho_domain::Config::default()
    };

    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    #[test]
    fn config_file_round_trips_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
            [store]
            base_url = "https://store.example.com/rest/v1"

            [channel]
            send_url = "https://hooks.example.com/send"
            finish_url = "https://hooks.example.com/finish"
            send_timeout_secs = 10

            [operator]
            owner_id = "op-1"

            [sync]
            poll_secs = 3
            "#
        )
        .unwrap();

        std::env::set_var("HO_CONFIG", &path);
        let (config, used_path) = super::load_config().unwrap();
        std::env::remove_var("HO_CONFIG");

        assert_eq!(used_path, path.to_string_lossy());
        assert_eq!(config.sync.poll_secs, 3);
        assert_eq!(config.operator.owner_id, "op-1");
    }
}
