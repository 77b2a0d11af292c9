//! Script execution and report rendering.

use crate::script::{Command, Line, ScriptError};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use txmap_core::{ContextId, StatsSnapshot, TransactionalMap};

/// Map type scripts run against.
pub type ScriptMap = TransactionalMap<String, String>;

/// Runs every line against `map`, returning the lines `get` and `size` print.
///
/// Script context numbers are bound to contexts allocated from `map`, so
/// they never clash with contexts the caller allocates afterwards.
pub fn run(map: &ScriptMap, lines: &[Line]) -> Result<Vec<String>, ScriptError> {
    let mut bound: HashMap<ContextId, ContextId> = HashMap::new();
    let mut output = Vec::new();

    for line in lines {
        let named = line.context;
        let ctx = *bound.entry(named).or_insert_with(|| map.context());
        let fail = |source| ScriptError::Core {
            line: line.number,
            source,
        };
        debug!(line = line.number, context = %named, command = ?line.command, "running");

        match &line.command {
            Command::Begin => {
                map.start_transaction(ctx).map_err(fail)?;
            }
            Command::Commit => {
                let seq = map.commit(ctx).map_err(fail)?;
                debug!(context = %named, %seq, "committed");
            }
            Command::Rollback => map.rollback(ctx).map_err(fail)?,
            Command::Put(key, value) => {
                map.put(ctx, key.clone(), value.clone());
            }
            Command::Remove(key) => {
                map.remove(ctx, key);
            }
            Command::Get(key) => {
                let shown = map.get(ctx, key).unwrap_or_else(|| "<absent>".to_string());
                output.push(format!("{named} get {key} = {shown}"));
            }
            Command::Size => output.push(format!("{named} size = {}", map.len(ctx))),
        }
    }

    Ok(output)
}

/// Final state report.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Shared store contents, sorted by key.
    pub entries: BTreeMap<String, String>,
    /// Sequence number of the last commit.
    pub committed_seq: u64,
    /// Transactions left open when the script ended.
    pub open_transactions: usize,
    /// Operation counters, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsReport>,
}

/// Serializable copy of [`StatsSnapshot`].
#[derive(Debug, Serialize)]
pub struct StatsReport {
    reads: u64,
    writes: u64,
    deletes: u64,
    transactions_started: u64,
    transactions_committed: u64,
    transactions_rolled_back: u64,
    transactions_replaced: u64,
}

impl From<StatsSnapshot> for StatsReport {
    fn from(snap: StatsSnapshot) -> Self {
        Self {
            reads: snap.reads,
            writes: snap.writes,
            deletes: snap.deletes,
            transactions_started: snap.transactions_started,
            transactions_committed: snap.transactions_committed,
            transactions_rolled_back: snap.transactions_rolled_back,
            transactions_replaced: snap.transactions_replaced,
        }
    }
}

impl Report {
    /// Captures the shared store as seen from outside any transaction.
    pub fn capture(map: &ScriptMap, with_stats: bool) -> Self {
        // Freshly allocated, so it never has an open transaction.
        let observer = map.context();
        Self {
            entries: map.to_map(observer).into_iter().collect(),
            committed_seq: map.committed_seq().as_u64(),
            open_transactions: map.active_transactions(),
            stats: with_stats.then(|| map.stats().snapshot().into()),
        }
    }

    /// Renders as `key = value` lines followed by a summary.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.entries {
            text.push_str(&format!("{key} = {value}\n"));
        }
        text.push_str(&format!(
            "-- {} entries, committed seq {}, {} open transaction(s)\n",
            self.entries.len(),
            self.committed_seq,
            self.open_transactions
        ));
        if let Some(stats) = &self.stats {
            text.push_str(&format!("-- stats: {stats:?}\n"));
        }
        text
    }

    /// Renders as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
