//! Collateral event scanning.
//!
//! Walks the registry in order and pulls both collateral signatures for each
//! cauldron with a single filter call, so adds and removes on one contract keep
//! their relative order. Matches are grouped per cauldron: logs from different
//! cauldrons are not interleaved by their position in the transaction.

mod transaction;

pub use transaction::{TransactionEvent, TxEvent};

use alloy::primitives::{Address, Log, B256};
use alloy::sol_types::SolEvent;
use tracing::warn;

use crate::events::{EventKind, LogAddCollateral, LogRemoveCollateral, MonitoredEvent};
use crate::registry::ContractRegistry;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("malformed {kind} log #{position} on {cauldron} ({contract}): {reason}")]
    MalformedEvent {
        kind: EventKind,
        cauldron: String,
        contract: Address,
        /// Position among the cauldron's matched logs.
        position: usize,
        reason: String,
    },

    #[error("log #{position} on {cauldron} ({contract}) has no collateral signature: {topic:?}")]
    UnknownSignature {
        topic: Option<B256>,
        cauldron: String,
        contract: Address,
        position: usize,
    },
}

enum DecodeFailure {
    UnknownSignature(Option<B256>),
    Malformed(EventKind, String),
}

/// A decoded event tagged with the registry name of the cauldron that emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEvent {
    pub cauldron: String,
    pub event: MonitoredEvent,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub matches: Vec<ScannedEvent>,
    pub skipped: Vec<ScanError>,
}

/// Scans for every collateral event kind.
pub fn scan<T>(tx: &T, registry: &ContractRegistry) -> ScanOutcome
where
    T: TransactionEvent + ?Sized,
{
    scan_kinds(tx, registry, &EventKind::ALL)
}

/// Scans only for `kinds`. Logs that fail to decode are skipped and reported.
pub fn scan_kinds<T>(tx: &T, registry: &ContractRegistry, kinds: &[EventKind]) -> ScanOutcome
where
    T: TransactionEvent + ?Sized,
{
    let signatures: Vec<_> = kinds.iter().map(EventKind::signature_hash).collect();
    let mut outcome = ScanOutcome::default();
    if signatures.is_empty() {
        return outcome;
    }

    for cauldron in registry.iter() {
        let logs = tx.filter_log(&signatures, cauldron.address);
        if logs.is_empty() {
            continue;
        }

        for (position, log) in logs.into_iter().enumerate() {
            match decode(log) {
                Ok(event) => outcome.matches.push(ScannedEvent {
                    cauldron: cauldron.name.clone(),
                    event,
                }),
                Err(failure) => {
                    let cauldron_name = cauldron.name.clone();
                    let err = match failure {
                        DecodeFailure::UnknownSignature(topic) => ScanError::UnknownSignature {
                            topic,
                            cauldron: cauldron_name,
                            contract: cauldron.address,
                            position,
                        },
                        DecodeFailure::Malformed(kind, reason) => ScanError::MalformedEvent {
                            kind,
                            cauldron: cauldron_name,
                            contract: cauldron.address,
                            position,
                            reason,
                        },
                    };
                    warn!("Skipping log: {}", err);
                    outcome.skipped.push(err);
                }
            }
        }
    }

    outcome
}

fn decode(log: &Log) -> Result<MonitoredEvent, DecodeFailure> {
    let topic = log.topics().first().copied();
    let kind = topic
        .as_ref()
        .and_then(EventKind::from_signature_hash)
        .ok_or(DecodeFailure::UnknownSignature(topic))?;

    let (from, to, share) = match kind {
        EventKind::CollateralAdded => LogAddCollateral::decode_log(log, true)
            .map(|decoded| (decoded.data.from, decoded.data.to, decoded.data.share)),
        EventKind::CollateralRemoved => LogRemoveCollateral::decode_log(log, true)
            .map(|decoded| (decoded.data.from, decoded.data.to, decoded.data.share)),
    }
    .map_err(|e| DecodeFailure::Malformed(kind, e.to_string()))?;

    Ok(MonitoredEvent {
        kind,
        from,
        to,
        share,
        contract: log.address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes, U256};

    const FTM: Address = address!("05500e2Ee779329698DF35760bEdcAAC046e7C27");
    const WBTC: Address = address!("5ec47EE69BEde0b6C2A2fC0D9d094dF16C192498");
    const FROM: Address = address!("DefC385D7038f391Eb0063C2f7C238cFb55b206C");
    const TO: Address = address!("Da1EC4dA97019972759FedA1285878b97FDCC014");

    fn registry() -> ContractRegistry {
        ContractRegistry::from_entries([(FTM.to_string(), "FTM"), (WBTC.to_string(), "WBTC")])
            .unwrap()
    }

    fn add(contract: Address, share: u64) -> Log {
        let event = LogAddCollateral {
            from: FROM,
            to: TO,
            share: U256::from(share),
        };
        Log {
            address: contract,
            data: event.encode_log_data(),
        }
    }

    fn remove(contract: Address, share: u64) -> Log {
        let event = LogRemoveCollateral {
            from: TO,
            to: FROM,
            share: U256::from(share),
        };
        Log {
            address: contract,
            data: event.encode_log_data(),
        }
    }

    fn summary(outcome: &ScanOutcome) -> Vec<(&str, EventKind, u64)> {
        outcome
            .matches
            .iter()
            .map(|m| (m.cauldron.as_str(), m.event.kind, m.event.share.to::<u64>()))
            .collect()
    }

    #[test]
    fn groups_by_registry_order_then_log_order() {
        let tx = TxEvent::default()
            .with_log(add(WBTC, 1))
            .with_log(remove(FTM, 2))
            .with_log(remove(WBTC, 3))
            .with_log(add(FTM, 4));

        let outcome = scan(&tx, &registry());
        assert_eq!(
            summary(&outcome),
            [
                ("FTM", EventKind::CollateralRemoved, 2),
                ("FTM", EventKind::CollateralAdded, 4),
                ("WBTC", EventKind::CollateralAdded, 1),
                ("WBTC", EventKind::CollateralRemoved, 3),
            ]
        );
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn decodes_event_arguments() {
        let tx = TxEvent::default().with_log(remove(FTM, 9));
        let outcome = scan(&tx, &registry());
        assert_eq!(
            outcome.matches[0].event,
            MonitoredEvent {
                kind: EventKind::CollateralRemoved,
                from: TO,
                to: FROM,
                share: U256::from(9),
                contract: FTM,
            }
        );
    }

    #[test]
    fn ignores_unregistered_contracts() {
        let stranger = address!("00000000000eAFb5E25c6bDC9f6CB5deadbeef00");
        let tx = TxEvent::default().with_log(add(stranger, 1));
        let outcome = scan(&tx, &registry());
        assert!(outcome.matches.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn kind_subset_only_sees_its_signature() {
        let tx = TxEvent::default().with_log(add(FTM, 1)).with_log(remove(FTM, 2));
        let outcome = scan_kinds(&tx, &registry(), &[EventKind::CollateralRemoved]);
        assert_eq!(summary(&outcome), [("FTM", EventKind::CollateralRemoved, 2)]);

        assert!(scan_kinds(&tx, &registry(), &[]).matches.is_empty());
    }

    /// Hands back every log at the address, whatever its signature.
    struct Unfiltered(Vec<Log>);

    impl TransactionEvent for Unfiltered {
        fn logs(&self) -> &[Log] {
            &self.0
        }

        fn filter_log(&self, _signatures: &[B256], address: Address) -> Vec<&Log> {
            self.0.iter().filter(|log| log.address == address).collect()
        }
    }

    #[test]
    fn foreign_signature_is_reported_as_unknown() {
        let transfer = Log::new_unchecked(FTM, vec![B256::repeat_byte(0x11)], Bytes::new());
        let bare = Log::new_unchecked(FTM, vec![], Bytes::new());
        let tx = Unfiltered(vec![transfer, bare, remove(FTM, 3)]);

        let outcome = scan(&tx, &registry());
        assert_eq!(summary(&outcome), [("FTM", EventKind::CollateralRemoved, 3)]);
        assert_eq!(
            outcome.skipped,
            [
                ScanError::UnknownSignature {
                    topic: Some(B256::repeat_byte(0x11)),
                    cauldron: "FTM".into(),
                    contract: FTM,
                    position: 0,
                },
                ScanError::UnknownSignature {
                    topic: None,
                    cauldron: "FTM".into(),
                    contract: FTM,
                    position: 1,
                },
            ]
        );
    }

    #[test]
    fn skips_malformed_logs_and_keeps_going() {
        let good = add(FTM, 5);
        // topic0 matches but the indexed addresses and data are missing
        let truncated = Log::new_unchecked(
            FTM,
            vec![LogAddCollateral::SIGNATURE_HASH],
            Bytes::new(),
        );
        let tx = TxEvent::default()
            .with_log(truncated)
            .with_log(good)
            .with_log(add(WBTC, 6));

        let outcome = scan(&tx, &registry());
        assert_eq!(
            summary(&outcome),
            [
                ("FTM", EventKind::CollateralAdded, 5),
                ("WBTC", EventKind::CollateralAdded, 6),
            ]
        );
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            &outcome.skipped[0],
            ScanError::MalformedEvent {
                kind: EventKind::CollateralAdded,
                position: 0,
                contract,
                ..
            } if *contract == FTM
        ));
    }
}
