use serde::{Deserialize, Serialize};

use crate::events::{Category, MonitoredEvent, Severity};
use crate::num::Converter;

/// Raw event arguments attached to an alert; `share` is left unscaled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertMetadata {
    pub from: String,
    pub to: String,
    pub share: String,
}

/// One detected collateral movement, ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub name: String,
    pub description: String,
    pub alert_id: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub category: Category,
    pub metadata: AlertMetadata,
}

pub fn synthesize(cauldron: &str, event: &MonitoredEvent) -> Alert {
    let amount = Converter::default().to_fixed(event.share, 2);

    Alert {
        name: format!("{} Event in {} Cauldron", event.kind.label(), cauldron),
        description: format!("{} shares {} {}", amount, cauldron, event.kind.verb()),
        alert_id: event.kind.alert_id().to_string(),
        severity: Severity::Info,
        category: Category::Info,
        metadata: AlertMetadata {
            from: event.from.to_string(),
            to: event.to.to_string(),
            share: event.share.to_string(),
        },
    }
}
