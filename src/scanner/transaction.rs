use alloy::primitives::{Address, Log, B256};

/// Read-only view of one transaction's logs, in emission order.
pub trait TransactionEvent {
    fn logs(&self) -> &[Log];

    /// Logs emitted by `address` whose topic0 is any of `signatures`, in order.
    fn filter_log(&self, signatures: &[B256], address: Address) -> Vec<&Log> {
        self.logs()
            .iter()
            .filter(|log| log.address == address)
            .filter(|log| {
                log.topics()
                    .first()
                    .is_some_and(|topic| signatures.contains(topic))
            })
            .collect()
    }
}

/// Transaction logs as delivered by the listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxEvent {
    pub hash: B256,
    pub block_number: u64,
    pub logs: Vec<Log>,
}

impl TxEvent {
    pub fn new(hash: B256, block_number: u64) -> Self {
        Self {
            hash,
            block_number,
            logs: Vec::new(),
        }
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.logs.push(log);
        self
    }
}

impl TransactionEvent for TxEvent {
    fn logs(&self) -> &[Log] {
        &self.logs
    }
}
