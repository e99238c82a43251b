use alloy::providers::{Provider, ProviderBuilder, RootProvider, WsConnect};
use alloy::pubsub::PubSubFrontend;
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};
use eyre::Result;
use futures_util::{Stream, StreamExt};
use url::Url;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use crate::events::EventKind;
use crate::registry::ContractRegistry;
use crate::scanner::TxEvent;
use crate::state::AppState;

pub type WsProvider = RootProvider<PubSubFrontend>;

/// How long a partially collected transaction may sit before it is flushed.
pub const TX_IDLE_FLUSH: Duration = Duration::from_secs(2);

pub async fn connect(rpc_url: &str) -> Result<WsProvider> {
    let url = Url::parse(rpc_url)?;
    let ws = WsConnect::new(url);
    let provider = ProviderBuilder::new().on_ws(ws).await?;
    Ok(provider)
}

pub async fn watch_blocks(provider: Arc<WsProvider>, state: Arc<AppState>) -> Result<()> {
    let sub = provider.subscribe_blocks().await?;
    let mut stream = sub.into_stream();

    while let Some(block) = stream.next().await {
        let number = block.header.number.unwrap_or_default();
        state.update_block(number);
        debug!("New Block: {:?}", number);
    }

    Ok(())
}

/// Subscribes to collateral events from every registered cauldron and
/// forwards them one transaction at a time.
pub async fn watch_logs(
    provider: Arc<WsProvider>,
    registry: &ContractRegistry,
    kinds: &[EventKind],
    tx: Sender<TxEvent>,
) -> Result<()> {
    let filter = Filter::new()
        .address(registry.addresses())
        .event_signature(kinds.iter().map(EventKind::signature_hash).collect::<Vec<_>>())
        .from_block(BlockNumberOrTag::Latest);

    let sub = provider.subscribe_logs(&filter).await?;
    info!("Subscribed to {} cauldrons", registry.len());

    forward_logs(sub.into_stream(), TX_IDLE_FLUSH, tx).await
}

/// Drains `logs` into per-transaction batches. Returns when the stream ends
/// or the receiver is gone.
pub async fn forward_logs<S>(mut logs: S, idle: Duration, tx: Sender<TxEvent>) -> Result<()>
where
    S: Stream<Item = Log> + Unpin,
{
    let mut batcher = TxBatcher::default();

    loop {
        match tokio::time::timeout(idle, logs.next()).await {
            Ok(Some(log)) => {
                if let Some(done) = batcher.push(log) {
                    if !deliver(&tx, done).await {
                        return Ok(());
                    }
                }
            }
            Ok(None) => break,
            Err(_) => {
                if let Some(done) = batcher.flush() {
                    if !deliver(&tx, done).await {
                        return Ok(());
                    }
                }
            }
        }
    }

    if let Some(done) = batcher.flush() {
        deliver(&tx, done).await;
    }
    info!("Log stream ended");
    Ok(())
}

/// Sends a finished transaction; false once the receiver is gone.
async fn deliver(tx: &Sender<TxEvent>, done: TxEvent) -> bool {
    let hash = done.hash;
    match tx.send(done).await {
        Ok(()) => true,
        Err(_) => {
            warn!("Transaction receiver dropped, discarding {} and stopping log listener", hash);
            false
        }
    }
}

/// Groups consecutive logs sharing a transaction hash.
#[derive(Debug, Default)]
pub struct TxBatcher {
    current: Option<TxEvent>,
}

impl TxBatcher {
    /// Adds a log; returns the previous transaction once a new one starts.
    pub fn push(&mut self, log: Log) -> Option<TxEvent> {
        if log.removed {
            debug!("Dropping removed log from {:?}", log.transaction_hash);
            return None;
        }
        let hash = log.transaction_hash.unwrap_or_default();

        match self.current.as_mut() {
            Some(current) if current.hash == hash => {
                current.logs.push(log.inner);
                None
            }
            _ => {
                let block_number = log.block_number.unwrap_or_default();
                let next = TxEvent::new(hash, block_number).with_log(log.inner);
                self.current.replace(next)
            }
        }
    }

    pub fn flush(&mut self) -> Option<TxEvent> {
        self.current.take()
    }
}
