use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient balance: user has {have} mCC, needs {need} mCC")]
    InsufficientBalance { have: i128, need: i128 },

    #[error("insufficient hold for task {task_id}: remaining {remaining} mCC, requested {requested} mCC")]
    InsufficientHold {
        task_id: String,
        remaining: u128,
        requested: u128,
    },

    #[error("no active hold for task {0}")]
    NoSuchHold(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Conservation (§3 invariant 1) was violated. Constructed only to be
    /// logged immediately before an explicit process abort — never
    /// returned to a caller as a recoverable `Result`.
    #[error("conservation invariant violated: circulation={circulation} accounted={accounted}")]
    ConservationViolated { circulation: i128, accounted: i128 },
}
