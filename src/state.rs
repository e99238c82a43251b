use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use std::sync::Mutex;

use crate::findings::Alert;

const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub alert: Alert,
    pub cauldron: String,
    pub seen_at: Instant,
}

/// Dashboard state shared between the listener, the alert consumer and the TUI.
#[derive(Debug)]
pub struct AppState {
    pub last_block: AtomicU64,
    pub last_block_time: Mutex<Instant>,
    pub alert_history: Mutex<VecDeque<AlertRecord>>,
    pub cauldron_counts: Mutex<HashMap<String, u64>>,
    pub kind_counts: Mutex<HashMap<String, u64>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            last_block: AtomicU64::new(0),
            last_block_time: Mutex::new(Instant::now()),
            alert_history: Mutex::new(VecDeque::with_capacity(HISTORY_LIMIT)),
            cauldron_counts: Mutex::new(HashMap::new()),
            kind_counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn update_block(&self, block: u64) {
        self.last_block.store(block, Ordering::Relaxed);
        if let Ok(mut time) = self.last_block_time.lock() {
            *time = Instant::now();
        }
    }

    /// Every alert gets its own history entry, identical ones included.
    pub fn add_alert(&self, cauldron: &str, alert: &Alert) {
        if let Ok(mut counts) = self.cauldron_counts.lock() {
            *counts.entry(cauldron.to_string()).or_insert(0) += 1;
        }
        if let Ok(mut counts) = self.kind_counts.lock() {
            *counts.entry(event_label(alert).to_string()).or_insert(0) += 1;
        }

        if let Ok(mut history) = self.alert_history.lock() {
            if history.len() >= HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(AlertRecord {
                alert: alert.clone(),
                cauldron: cauldron.to_string(),
                seen_at: Instant::now(),
            });
        }
    }
}

/// Event name prefix of an alert name, e.g. `LogAddCollateral`.
pub fn event_label(alert: &Alert) -> &str {
    alert.name.split_whitespace().next().unwrap_or_default()
}
