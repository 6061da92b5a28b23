use crate::entry::LedgerEntry;
use crate::error::LedgerError;

/// A write-ahead observer of every post, in order (§6 "Ledger sink").
///
/// `on_post` must complete before `Ledger::post` returns `Ok` when
/// durability is required — the core never assumes the sink is async or
/// best-effort.
pub trait LedgerSink: Send + Sync {
    fn on_post(&self, entry: &LedgerEntry) -> Result<(), LedgerError>;

    /// Replay the journal in posted order, e.g. at process start.
    fn replay(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
}

/// A `sled`-backed [`LedgerSink`]. Entries are stored under their `id` as a
/// big-endian key so `replay` iterates in posted order for free.
#[cfg(feature = "durable-sink")]
pub struct SledLedgerSink {
    tree: sled::Tree,
}

#[cfg(feature = "durable-sink")]
impl SledLedgerSink {
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, LedgerError> {
        let db = sled::open(path).map_err(|e| LedgerError::Storage(e.to_string()))?;
        let tree = db
            .open_tree("ledger_entries")
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(Self { tree })
    }
}

#[cfg(feature = "durable-sink")]
impl LedgerSink for SledLedgerSink {
    fn on_post(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let bytes =
            serde_json::to_vec(entry).map_err(|e| LedgerError::Storage(e.to_string()))?;
        self.tree
            .insert(entry.id.to_be_bytes(), bytes)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        self.tree
            .flush()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(())
    }

    fn replay(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut out = Vec::new();
        for item in self.tree.iter() {
            let (_, bytes) = item.map_err(|e| LedgerError::Storage(e.to_string()))?;
            let entry: LedgerEntry =
                serde_json::from_slice(&bytes).map_err(|e| LedgerError::Storage(e.to_string()))?;
            out.push(entry);
        }
        Ok(out)
    }
}
