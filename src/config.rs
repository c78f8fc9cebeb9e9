use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aralin", about = "A small learning platform API")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory (holds config.toml)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Start with an empty store instead of the demo data
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub seed: SeedConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Leaderboard size when the request has no `limit`
    pub leaderboard_limit: usize,
    /// Forum feed size when the request has no `limit`
    pub forum_limit: usize,
    /// Upper bound applied to any requested `limit`
    pub max_limit: usize,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Require an admin `X-User-Id` on admin endpoints
    pub enforce_admin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            leaderboard_limit: 10,
            forum_limit: 20,
            max_limit: 100,
        }
    }
}

impl ApiConfig {
    /// Resolve a requested page size against the default and the cap.
    pub fn clamp_limit(&self, requested: Option<usize>, default: usize) -> usize {
        requested.unwrap_or(default).min(self.max_limit)
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = match &cli.config {
            Some(path) => Some(path.clone()),
            None => Self::data_dir(cli).map(|dir| dir.join("config.toml")),
        };

        let mut config = match config_path {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from {}", path.display());
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content)?
            }
            _ => Config::default(),
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if cli.no_seed {
            config.seed.enabled = false;
        }

        Ok(config)
    }

    /// `--data-dir`, else `~/.aralin` when a home directory is known.
    pub fn data_dir(cli: &Cli) -> Option<PathBuf> {
        cli.data_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".aralin")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(data_dir: Option<PathBuf>) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir,
            no_seed: false,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.seed.enabled);
        assert_eq!(config.api.leaderboard_limit, 10);
        assert_eq!(config.api.forum_limit, 20);
        assert!(!config.auth.enforce_admin);
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli(Some(PathBuf::from("/tmp/test-aralin")));
        assert_eq!(Config::data_dir(&cli), Some(PathBuf::from("/tmp/test-aralin")));
    }

    #[test]
    fn data_dir_defaults_to_home_dot_aralin() {
        if let Some(dir) = Config::data_dir(&cli(None)) {
            assert!(dir.ends_with(".aralin"));
        }
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.seed.enabled);
    }

    #[test]
    fn load_applies_cli_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            config: None,
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            data_dir: Some(tmp.path().to_path_buf()),
            no_seed: true,
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(!config.seed.enabled);
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
port = 9000

[api]
leaderboard_limit = 5
max_limit = 50

[auth]
enforce_admin = true
"#,
        )
        .unwrap();

        let config = Config::load(&cli(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.api.leaderboard_limit, 5);
        assert_eq!(config.api.forum_limit, 20);
        assert_eq!(config.api.max_limit, 50);
        assert!(config.auth.enforce_admin);
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("custom.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: Some("10.0.0.1".to_string()),
            port: Some(4000),
            data_dir: Some(tmp.path().to_path_buf()),
            no_seed: false,
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn limits_are_clamped() {
        let api = ApiConfig::default();
        assert_eq!(api.clamp_limit(None, 10), 10);
        assert_eq!(api.clamp_limit(Some(3), 10), 3);
        assert_eq!(api.clamp_limit(Some(10_000), 10), 100);
    }
}
