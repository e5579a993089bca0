//! Time source for deadline checks.
//!
//! The ledger never owns time: every operation asks a [`Clock`] once at entry
//! and compares against the stored deadlines. On-chain that clock is the
//! Clock sysvar account passed with the instruction.

use pinocchio::{error::ProgramError, AccountView, Address};
use pinocchio_pubkey::pubkey;

/// Sysvar: Clock (slot, epoch, unix_timestamp, leader_schedule_epoch).
pub const SYSVAR_CLOCK: Address =
    Address::new_from_array(pubkey!("SysvarC1ock11111111111111111111111111111111"));

/// Offset of `unix_timestamp` inside the Clock sysvar.
///
/// ```text
///  0..8   slot                   (u64)
///  8..16  epoch_start_timestamp  (i64)
/// 16..24  epoch                  (u64)
/// 24..32  leader_schedule_epoch  (u64)
/// 32..40  unix_timestamp         (i64)
/// ```
pub const UNIX_TIMESTAMP_OFFSET: usize = 32;

/// Monotonic source of unix timestamps.
pub trait Clock {
    fn now(&self) -> Result<i64, ProgramError>;
}

/// [`Clock`] backed by the Clock sysvar account.
pub struct SysvarClock<'a> {
    account: &'a AccountView,
}

impl<'a> SysvarClock<'a> {
    /// Wrap `account` after confirming it really is the Clock sysvar.
    #[inline(always)]
    pub fn new(account: &'a AccountView) -> Result<Self, ProgramError> {
        if *account.address() != SYSVAR_CLOCK {
            return Err(ProgramError::InvalidArgument);
        }
        Ok(Self { account })
    }
}

impl Clock for SysvarClock<'_> {
    fn now(&self) -> Result<i64, ProgramError> {
        let data = self.account.try_borrow()?;
        read_unix_timestamp(&data)
    }
}

/// Read `unix_timestamp` from raw Clock sysvar data.
#[inline(always)]
pub fn read_unix_timestamp(data: &[u8]) -> Result<i64, ProgramError> {
    let field = data
        .get(UNIX_TIMESTAMP_OFFSET..UNIX_TIMESTAMP_OFFSET + 8)
        .ok_or(ProgramError::AccountDataTooSmall)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(field);
    Ok(i64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_timestamp_field() {
        let mut data = [0u8; 40];
        data[0..8].copy_from_slice(&77u64.to_le_bytes());
        data[32..40].copy_from_slice(&1_700_000_000i64.to_le_bytes());
        assert_eq!(read_unix_timestamp(&data), Ok(1_700_000_000));
    }

    #[test]
    fn short_sysvar_data_is_rejected() {
        assert_eq!(
            read_unix_timestamp(&[0u8; 39]),
            Err(ProgramError::AccountDataTooSmall)
        );
    }
}
