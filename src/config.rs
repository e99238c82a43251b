use serde::Deserialize;
use config::{Config, ConfigError, File};

use crate::events::EventKind;
use crate::registry::{ContractRegistry, RegistryError};

#[derive(Debug, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct CauldronConfig {
    pub name: String,
    pub address: String,
}

fn default_events() -> Vec<String> {
    EventKind::ALL.iter().map(|k| k.label().to_string()).collect()
}

#[derive(Debug, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_events")]
    pub events: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { events: default_events() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsConfig {
    #[serde(default)]
    pub webhook_url: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub cauldrons: Vec<CauldronConfig>,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("config")
    }

    pub fn from_file(name: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(name));

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Environment overrides, kept for `.env` based setups.
    pub fn apply_env(&mut self) {
        if let Ok(rpc) = std::env::var("RPC_URL") {
            self.chain.rpc_url = rpc;
        }
        if let Ok(url) = std::env::var("DISCORD_WEBHOOK_URL") {
            self.alerts.webhook_url = url;
        }
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.alerts.telegram_bot_token = Some(token);
        }
        if let Ok(chat) = std::env::var("TELEGRAM_CHAT_ID") {
            self.alerts.telegram_chat_id = Some(chat);
        }
    }

    pub fn registry(&self) -> Result<ContractRegistry, RegistryError> {
        ContractRegistry::from_entries(
            self.cauldrons
                .iter()
                .map(|c| (c.address.as_str(), c.name.as_str())),
        )
    }

    pub fn event_kinds(&self) -> Result<Vec<EventKind>, ConfigError> {
        let mut kinds = Vec::new();
        for name in &self.monitor.events {
            let kind = name
                .parse::<EventKind>()
                .map_err(|e| ConfigError::Message(e.to_string()))?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(ConfigError::Message("monitor.events is empty".into()));
        }
        Ok(kinds)
    }
}
