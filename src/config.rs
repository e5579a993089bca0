use pinocchio::error::ProgramError;

use crate::error::StakerError;

/// Seconds from initialization (or reset) until withdrawals open.
pub const DEFAULT_WITHDRAWAL_WINDOW: i64 = 120;

/// Seconds from initialization (or reset) until the pool can be executed.
pub const DEFAULT_CLAIM_WINDOW: i64 = 240;

/// Parameters fixed when a ledger is created.
///
/// The two windows are the offsets every deadline cycle is computed from,
/// both at initialization and on `ResetDeadlines`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    pub withdrawal_window: i64,
    pub claim_window: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            withdrawal_window: DEFAULT_WITHDRAWAL_WINDOW,
            claim_window: DEFAULT_CLAIM_WINDOW,
        }
    }
}

impl LedgerConfig {
    /// Reject windows that would break `withdrawal_deadline < claim_deadline`.
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.withdrawal_window < 0 || self.claim_window <= self.withdrawal_window {
            return Err(StakerError::InvalidConfig.into());
        }
        Ok(())
    }
}
