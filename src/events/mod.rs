use alloy::primitives::{Address, B256, U256};
use alloy::sol;
use alloy::sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event LogAddCollateral(address indexed from, address indexed to, uint256 share);

    #[derive(Debug, PartialEq, Eq)]
    event LogRemoveCollateral(address indexed from, address indexed to, uint256 share);
}

/// Collateral movements a cauldron can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CollateralAdded,
    CollateralRemoved,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::CollateralAdded, EventKind::CollateralRemoved];

    /// Solidity event name, as it appears in the cauldron ABI.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::CollateralAdded => "LogAddCollateral",
            EventKind::CollateralRemoved => "LogRemoveCollateral",
        }
    }

    pub fn signature_hash(&self) -> B256 {
        match self {
            EventKind::CollateralAdded => LogAddCollateral::SIGNATURE_HASH,
            EventKind::CollateralRemoved => LogRemoveCollateral::SIGNATURE_HASH,
        }
    }

    pub fn from_signature_hash(topic: &B256) -> Option<Self> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.signature_hash() == *topic)
    }

    pub fn alert_id(&self) -> &'static str {
        match self {
            EventKind::CollateralAdded => "ABRA-1",
            EventKind::CollateralRemoved => "ABRA-2",
        }
    }

    /// Past-tense verb used in alert descriptions.
    pub fn verb(&self) -> &'static str {
        match self {
            EventKind::CollateralAdded => "added",
            EventKind::CollateralRemoved => "removed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown collateral event: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Collateral alerts are informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Info,
}

/// A decoded collateral event observed on a registered cauldron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredEvent {
    pub kind: EventKind,
    pub from: Address,
    pub to: Address,
    pub share: U256,
    pub contract: Address,
}
