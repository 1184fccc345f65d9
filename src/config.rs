use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::session::DEFAULT_SESSION_TIMEOUT;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the analysis service
    #[arg(long, env = "ANALYSIS_URL")]
    pub analysis_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub ui: UiConfig,
    pub sessions: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub base_url: String,
    /// Unset means requests never time out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    /// Delay before the recommendations block is fetched and revealed.
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

impl AnalysisConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl SessionConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl AppConfig {
    /// Load from defaults, files and environment, ignoring command-line flags.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args().take(1))
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Priority: CLI flag / CLI env var > `SYMPTOM_*` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("analysis.base_url", "http://127.0.0.1:5000")?
            .set_default("ui.reveal_delay_ms", 500)?
            .set_default(
                "sessions.idle_timeout_secs",
                DEFAULT_SESSION_TIMEOUT.as_secs(),
            )?
            .set_default("sessions.sweep_interval_secs", 60)?;

        // Explicit file, else ./config.yaml when present
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new("config.yaml").exists() {
            builder =
                builder.add_source(File::new("config.yaml", FileFormat::Yaml).required(false));
        }

        // E.g. SYMPTOM_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("SYMPTOM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = &cli.analysis_url {
            builder = builder.set_override("analysis.base_url", url.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}
