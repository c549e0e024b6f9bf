//! ---
//! irh_section: "01-core-functionality"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Harness configuration model and file loading."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_endpoint_address() -> String {
    "http://127.0.0.1:50000".to_owned()
}

fn default_client_name() -> String {
    "irh-harness".to_owned()
}

fn default_connect_timeout() -> Option<Duration> {
    Some(Duration::from_secs(5))
}

fn default_scenario_vessel() -> String {
    "InfernalRobotics".to_owned()
}

fn default_scenario_directory() -> PathBuf {
    PathBuf::from("./")
}

fn default_remove_other_vessels() -> bool {
    true
}

fn default_simulator_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 50000))
}

fn default_fixture_root() -> PathBuf {
    PathBuf::from("fixtures/crafts")
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Primary configuration object shared by the daemon, the CLI and the suites.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarnessConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where a [`HarnessConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedHarnessConfig {
    pub config: HarnessConfig,
    pub source: PathBuf,
}

impl HarnessConfig {
    pub const ENV_CONFIG_PATH: &'static str = "IRH_CONFIG";

    /// Load configuration from disk, respecting the `IRH_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedHarnessConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedHarnessConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedHarnessConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<HarnessConfig>()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.endpoint.validate()?;
        self.scenario.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for HarnessConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: HarnessConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Where the remote service listens and how the client introduces itself.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_endpoint_address")]
    pub address: String,
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    pub connect_timeout: Option<Duration>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            address: default_endpoint_address(),
            client_name: default_client_name(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.address.starts_with("http://") || self.address.starts_with("https://")) {
            return Err(anyhow!(
                "endpoint address '{}' must use an http:// or https:// scheme",
                self.address
            ));
        }
        if self.client_name.trim().is_empty() {
            return Err(anyhow!("endpoint client_name must not be empty"));
        }
        Ok(())
    }
}

/// The vessel fixture a scenario loads before its cases run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_scenario_vessel")]
    pub vessel: String,
    #[serde(default = "default_scenario_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_remove_other_vessels")]
    pub remove_other_vessels: bool,
    #[serde(default)]
    pub expectations: Option<PathBuf>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            vessel: default_scenario_vessel(),
            directory: default_scenario_directory(),
            remove_other_vessels: default_remove_other_vessels(),
            expectations: None,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.vessel.trim().is_empty() {
            return Err(anyhow!("scenario vessel must not be empty"));
        }
        Ok(())
    }
}

/// Settings for the fixture-backed stand-in service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_simulator_listen")]
    pub listen: SocketAddr,
    #[serde(default = "default_fixture_root")]
    pub fixture_root: PathBuf,
    /// Crafts from the fixture root launched into every new save.
    #[serde(default)]
    pub seed_vessels: Vec<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            listen: default_simulator_listen(),
            fixture_root: default_fixture_root(),
            seed_vessels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: HarnessConfig = "".parse().expect("empty config parses");
        assert_eq!(config.endpoint.address, "http://127.0.0.1:50000");
        assert_eq!(config.endpoint.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.scenario.vessel, "InfernalRobotics");
        assert!(config.scenario.remove_other_vessels);
        assert_eq!(config.simulator.fixture_root, PathBuf::from("fixtures/crafts"));
        assert!(config.simulator.seed_vessels.is_empty());
    }

    #[test]
    fn sections_override_defaults() {
        let config: HarnessConfig = r#"
            [endpoint]
            address = "http://10.0.0.5:6000"
            client_name = "ci"
            connect_timeout = 2

            [scenario]
            vessel = "Rover"
            directory = "rovers"
            remove_other_vessels = false

            [simulator]
            listen = "0.0.0.0:7000"
            seed_vessels = ["Debris"]

            [logging]
            format = "pretty"
        "#
        .parse()
        .expect("config parses");

        assert_eq!(config.endpoint.client_name, "ci");
        assert_eq!(config.endpoint.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.scenario.directory, PathBuf::from("rovers"));
        assert!(!config.scenario.remove_other_vessels);
        assert_eq!(config.simulator.listen.port(), 7000);
        assert_eq!(config.simulator.seed_vessels, vec!["Debris".to_owned()]);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let err = r#"
            [endpoint]
            address = "127.0.0.1:50000"
        "#
        .parse::<HarnessConfig>()
        .unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn rejects_blank_vessel() {
        let result = r#"
            [scenario]
            vessel = "  "
        "#
        .parse::<HarnessConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn load_picks_first_existing_candidate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("harness.toml");
        fs::write(&present, "[scenario]\nvessel = \"Probe\"\n").expect("write config");
        let missing = dir.path().join("missing.toml");

        let loaded = HarnessConfig::load_with_source(&[missing, present.clone()])
            .expect("config loads");
        assert_eq!(loaded.source, present);
        assert_eq!(loaded.config.scenario.vessel, "Probe");
    }

    #[test]
    fn load_reports_inspected_candidates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nowhere.toml");
        let err = HarnessConfig::load(&[missing]).unwrap_err();
        assert!(err.to_string().contains("nowhere.toml"));
    }
}
