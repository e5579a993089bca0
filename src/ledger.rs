//! Ledger state transitions.
//!
//! Every transition runs all of its checks before touching the data, so a
//! rejected call leaves the ledger and the stake record byte-for-byte
//! unchanged. Transitions never move lamports themselves: they commit local
//! state and return the amount the caller must move afterwards.

use pinocchio::{error::ProgramError, Address};

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::error::StakerError;
use crate::math::{checked_add, checked_sub, deadline_after};
use crate::require;
use crate::state::{Ledger, Phase, StakeRecord};

/// Deadlines for a cycle starting at `now`.
pub fn cycle_deadlines(now: i64, config: &LedgerConfig) -> Result<(i64, i64), ProgramError> {
    Ok((
        deadline_after(now, config.withdrawal_window)?,
        deadline_after(now, config.claim_window)?,
    ))
}

impl<D: AsRef<[u8]> + AsMut<[u8]>> Ledger<D> {
    /// Create a ledger whose first cycle starts at `clock.now()`.
    pub fn open<C: Clock>(
        data: D,
        beneficiary_program: &Address,
        beneficiary_state: &Address,
        config: &LedgerConfig,
        authority_bump: u8,
        clock: &C,
    ) -> Result<Self, ProgramError> {
        config.validate()?;
        let (withdrawal_deadline, claim_deadline) = cycle_deadlines(clock.now()?, config)?;
        Self::initialize(
            data,
            beneficiary_program,
            beneficiary_state,
            config,
            authority_bump,
            withdrawal_deadline,
            claim_deadline,
        )
    }

    /// Credit `amount` to `record`. Returns the new balance.
    ///
    /// Staking stays open at any time until the pool is executed.
    pub fn stake<R: AsRef<[u8]> + AsMut<[u8]>>(
        &mut self,
        record: &mut StakeRecord<R>,
        amount: u64,
    ) -> Result<u64, ProgramError> {
        require!(amount > 0, StakerError::InvalidAmount);
        require!(!self.is_executed(), StakerError::AlreadyExecuted);

        let new_balance = checked_add(record.balance(), amount)?;
        let new_total = checked_add(self.total_staked(), amount)?;
        record.set_balance(new_balance);
        self.set_total_staked(new_total);
        Ok(new_balance)
    }

    /// Zero the record's balance and return the amount owed to its owner.
    ///
    /// Gate order is fixed: withdrawal deadline, then claim deadline, then
    /// balance. A caller with no record at all still sees the deadline errors.
    pub fn withdraw<C: Clock>(
        &mut self,
        clock: &C,
        record: Option<&mut StakeRecord<&mut [u8]>>,
    ) -> Result<u64, ProgramError> {
        match self.phase(clock.now()?) {
            Phase::Locked => return Err(StakerError::WithdrawalTooEarly.into()),
            Phase::Claimable => return Err(StakerError::ClaimWindowPassed.into()),
            Phase::WithdrawOpen => {}
        }
        let amount = record.as_ref().map_or(0, |r| r.balance());
        require!(amount > 0, StakerError::NoBalance);
        // A reset after execute reopens the window but the pool is gone.
        require!(!self.is_executed(), StakerError::AlreadyExecuted);

        let new_total = checked_sub(self.total_staked(), amount)?;
        if let Some(record) = record {
            record.set_balance(0);
        }
        self.set_total_staked(new_total);
        Ok(amount)
    }

    /// Mark the pool as executed. The caller then hands the whole pool to the
    /// beneficiary; tracked balances become unredeemable.
    pub fn execute<C: Clock>(&mut self, clock: &C) -> Result<(), ProgramError> {
        self.check_execute(clock)?;
        self.mark_executed();
        Ok(())
    }

    /// The checks of [`Ledger::execute`] without the state change: claim
    /// deadline first, then the executed flag.
    pub fn check_execute<C: Clock>(&self, clock: &C) -> Result<(), ProgramError> {
        require!(
            self.phase(clock.now()?) == Phase::Claimable,
            StakerError::ClaimTooEarly
        );
        require!(!self.is_executed(), StakerError::AlreadyExecuted);
        Ok(())
    }

    /// Start a new cycle from `clock.now()` with the configured windows.
    ///
    /// Open to any caller and allowed in every phase. The executed flag is
    /// left as is.
    pub fn reset_deadlines<C: Clock>(&mut self, clock: &C) -> Result<(i64, i64), ProgramError> {
        let (withdrawal_deadline, claim_deadline) =
            cycle_deadlines(clock.now()?, &self.config())?;
        self.set_deadlines(withdrawal_deadline, claim_deadline);
        Ok((withdrawal_deadline, claim_deadline))
    }
}
