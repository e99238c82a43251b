use serde::Serialize;
use reqwest::Client;
use tracing::{info, error};

use crate::config::AlertsConfig;
use crate::findings::Alert;

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{sink} rejected alert with status {status}")]
    Rejected {
        sink: &'static str,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    fields: Vec<EmbedField>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct DiscordPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct TelegramPayload {
    chat_id: String,
    text: String,
    parse_mode: String,
}

/// Pushes alerts to the configured Discord webhook and Telegram bot.
///
/// Every alert is delivered; failures are logged and dropped.
pub struct AlertManager {
    client: Client,
    config: AlertsConfig,
}

impl AlertManager {
    pub fn new(config: AlertsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.webhook_url.is_empty() || self.telegram_target().is_some()
    }

    pub async fn send_alert(&self, alert: &Alert) {
        info!("Sending Alert: [{}] {}", alert.alert_id, alert.description);

        if !self.config.webhook_url.is_empty() {
            match self.send_discord_alert(alert).await {
                Ok(()) => info!("Discord Alert Sent"),
                Err(e) => error!("Failed to send Discord alert: {}", e),
            }
        }
        if let Some((token, chat_id)) = self.telegram_target() {
            match self.send_telegram_alert(token, chat_id, alert).await {
                Ok(()) => info!("Telegram Alert Sent"),
                Err(e) => error!("Failed to send Telegram alert: {}", e),
            }
        }
    }

    fn telegram_target(&self) -> Option<(&str, &str)> {
        let token = self.config.telegram_bot_token.as_deref().filter(|t| !t.is_empty())?;
        let chat_id = self.config.telegram_chat_id.as_deref().filter(|c| !c.is_empty())?;
        Some((token, chat_id))
    }

    async fn send_discord_alert(&self, alert: &Alert) -> Result<(), AlertError> {
        let resp = self
            .client
            .post(&self.config.webhook_url)
            .json(&discord_payload(alert))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AlertError::Rejected { sink: "discord", status: resp.status() });
        }
        Ok(())
    }

    async fn send_telegram_alert(
        &self,
        token: &str,
        chat_id: &str,
        alert: &Alert,
    ) -> Result<(), AlertError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let resp = self
            .client
            .post(&url)
            .json(&telegram_payload(chat_id, alert))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AlertError::Rejected { sink: "telegram", status: resp.status() });
        }
        Ok(())
    }
}

fn field(name: &str, value: &str, inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: value.to_string(),
        inline,
    }
}

fn discord_payload(alert: &Alert) -> DiscordPayload {
    // green for deposits, amber for withdrawals
    let color = if alert.alert_id == "ABRA-2" { 0xE67E22 } else { 0x2ECC71 };

    let embed = DiscordEmbed {
        title: alert.name.clone(),
        description: alert.description.clone(),
        color,
        fields: vec![
            field("Alert ID", &alert.alert_id, true),
            field("Severity", &format!("{:?}", alert.severity), true),
            field("From", &alert.metadata.from, false),
            field("To", &alert.metadata.to, false),
            field("Share", &alert.metadata.share, false),
        ],
    };

    DiscordPayload {
        content: None,
        embeds: vec![embed],
    }
}

fn telegram_payload(chat_id: &str, alert: &Alert) -> TelegramPayload {
    let text = format!(
        "*{}*\n\n{}\n\n*Alert:* {}\n*From:* `{}`\n*To:* `{}`\n*Share:* `{}`",
        alert.name,
        alert.description,
        alert.alert_id,
        alert.metadata.from,
        alert.metadata.to,
        alert.metadata.share
    );

    TelegramPayload {
        chat_id: chat_id.to_string(),
        text,
        parse_mode: "Markdown".to_string(),
    }
}
