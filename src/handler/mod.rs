use std::sync::Arc;
use tracing::debug;

use crate::events::EventKind;
use crate::findings::{synthesize, Alert};
use crate::registry::ContractRegistry;
use crate::scanner::{scan_kinds, TransactionEvent};

/// Turns a transaction's cauldron collateral events into alerts.
///
/// Holds no mutable state; a single instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct CollateralMonitor {
    registry: Arc<ContractRegistry>,
    kinds: Vec<EventKind>,
}

impl CollateralMonitor {
    pub fn new(registry: Arc<ContractRegistry>) -> Self {
        Self::with_events(registry, EventKind::ALL.to_vec())
    }

    pub fn with_events(registry: Arc<ContractRegistry>, kinds: Vec<EventKind>) -> Self {
        Self { registry, kinds }
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    /// Alerts in registry order, then log order within each cauldron.
    /// Logs that fail to decode are left out.
    pub fn handle<T>(&self, tx: &T) -> Vec<Alert>
    where
        T: TransactionEvent + ?Sized,
    {
        self.handle_tagged(tx)
            .into_iter()
            .map(|(_, alert)| alert)
            .collect()
    }

    /// Like [`handle`](Self::handle), paired with the emitting cauldron's name.
    pub fn handle_tagged<T>(&self, tx: &T) -> Vec<(String, Alert)>
    where
        T: TransactionEvent + ?Sized,
    {
        let outcome = scan_kinds(tx, &self.registry, &self.kinds);

        let alerts: Vec<(String, Alert)> = outcome
            .matches
            .into_iter()
            .map(|m| {
                let alert = synthesize(&m.cauldron, &m.event);
                (m.cauldron, alert)
            })
            .collect();

        debug!(
            "Transaction scanned: {} alerts, {} malformed logs skipped",
            alerts.len(),
            outcome.skipped.len()
        );
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LogRemoveCollateral;
    use crate::scanner::TxEvent;
    use alloy::primitives::{address, Address, Log, U256};
    use alloy::sol_types::SolEvent;

    const YVWETH: Address = address!("920D9BD936Da4eAFb5E25c6bDC9f6CB528953F9f");

    #[test]
    fn remove_only_monitor_ignores_adds() {
        let registry =
            Arc::new(ContractRegistry::from_entries([(YVWETH.to_string(), "yvWETH")]).unwrap());
        let monitor = CollateralMonitor::with_events(registry, vec![EventKind::CollateralRemoved]);

        let removed = LogRemoveCollateral {
            from: Address::ZERO,
            to: Address::ZERO,
            share: U256::from(10).pow(U256::from(18)),
        };
        let added = crate::events::LogAddCollateral {
            from: Address::ZERO,
            to: Address::ZERO,
            share: U256::from(1),
        };
        let tx = TxEvent::default()
            .with_log(Log {
                address: YVWETH,
                data: added.encode_log_data(),
            })
            .with_log(Log {
                address: YVWETH,
                data: removed.encode_log_data(),
            });

        let alerts = monitor.handle(&tx);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_id, "ABRA-2");
        assert_eq!(alerts[0].description, "1.00 shares yvWETH removed");
        assert_eq!(monitor.kinds(), [EventKind::CollateralRemoved]);
    }
}
