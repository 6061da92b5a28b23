pub mod amount;
pub mod entry;
pub mod error;
pub mod hold;
pub mod ledger;
pub mod sink;

pub use amount::{from_mcc, to_mcc};
pub use entry::{AccountProjection, EntryKind, LedgerEntry};
pub use error::LedgerError;
pub use hold::Hold;
pub use ledger::Ledger;
pub use sink::LedgerSink;

#[cfg(feature = "durable-sink")]
pub use sink::SledLedgerSink;
