use askee_crypto::UserHash;
use serde::{Deserialize, Serialize};

/// Per-(user, task) reserved credits pending the outcome of a task.
///
/// Created by `reserve`, drained by `consume_from_hold` and/or
/// `refund_hold`; destroyed once `remaining() == 0` (§3 invariant 4).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    pub task_id: String,
    pub user_hash: UserHash,
    pub reserved_mcc: u128,
    pub consumed_mcc: u128,
    pub refunded_mcc: u128,
}

impl Hold {
    pub fn new(task_id: String, user_hash: UserHash, reserved_mcc: u128) -> Self {
        Self {
            task_id,
            user_hash,
            reserved_mcc,
            consumed_mcc: 0,
            refunded_mcc: 0,
        }
    }

    /// mCC still tied up, not yet consumed or refunded.
    pub fn remaining(&self) -> u128 {
        self.reserved_mcc - self.consumed_mcc - self.refunded_mcc
    }

    pub fn is_drained(&self) -> bool {
        self.remaining() == 0
    }
}
