use pinocchio::{error::ProgramError, AccountView, Address};

use crate::clock::SysvarClock;
use crate::state::{LEDGER_DISC, LEDGER_LEN};
use crate::system::SYSTEM_PROGRAM_ID;

/// Iterator-style account accessor with inline constraint checks.
///
/// Handlers consume accounts in the order their instruction documents:
///
/// ```rust,ignore
/// let mut accs = AccountList::new(accounts);
/// let participant = accs.next_participant()?;
/// let ledger      = accs.next_ledger(program_id)?;
/// let clock       = accs.next_clock()?;
/// ```
pub struct AccountList<'a> {
    accounts: &'a [AccountView],
    pos: usize,
}

impl<'a> AccountList<'a> {
    #[inline(always)]
    pub fn new(accounts: &'a [AccountView]) -> Self {
        Self { accounts, pos: 0 }
    }

    /// Consume the next account with no additional checks.
    #[inline(always)]
    pub fn next(&mut self) -> Result<&'a AccountView, ProgramError> {
        let acc = self
            .accounts
            .get(self.pos)
            .ok_or(ProgramError::NotEnoughAccountKeys)?;
        self.pos += 1;
        Ok(acc)
    }

    /// Consume the next account and verify it is marked writable.
    #[inline(always)]
    pub fn next_writable(&mut self) -> Result<&'a AccountView, ProgramError> {
        let acc = self.next()?;
        if !acc.is_writable() {
            return Err(ProgramError::InvalidArgument);
        }
        Ok(acc)
    }

    /// A caller acting on their own funds: writable signer.
    #[inline(always)]
    pub fn next_participant(&mut self) -> Result<&'a AccountView, ProgramError> {
        let acc = self.next_writable()?;
        if !acc.is_signer() {
            return Err(ProgramError::MissingRequiredSignature);
        }
        Ok(acc)
    }

    /// A keypair account about to be created: writable signer with no data.
    #[inline(always)]
    pub fn next_new_account(&mut self) -> Result<&'a AccountView, ProgramError> {
        let acc = self.next_participant()?;
        if !acc.is_data_empty() {
            return Err(ProgramError::AccountAlreadyInitialized);
        }
        Ok(acc)
    }

    /// The ledger: writable, owned by this program, carrying the ledger
    /// discriminator. Full layout validation happens in `Ledger::load`.
    #[inline(always)]
    pub fn next_ledger(&mut self, program_id: &Address) -> Result<&'a AccountView, ProgramError> {
        let acc = self.next_writable()?;
        if !acc.owned_by(program_id) {
            return Err(ProgramError::IncorrectProgramId);
        }
        let data = acc.try_borrow()?;
        if data.len() < LEDGER_LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        if data[0] != LEDGER_DISC {
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(acc)
    }

    /// A program account usable as a CPI target.
    #[inline(always)]
    pub fn next_executable(&mut self) -> Result<&'a AccountView, ProgramError> {
        let acc = self.next()?;
        if !acc.executable() {
            return Err(ProgramError::IncorrectProgramId);
        }
        Ok(acc)
    }

    #[inline(always)]
    pub fn next_system_program(&mut self) -> Result<&'a AccountView, ProgramError> {
        let acc = self.next()?;
        if *acc.address() != SYSTEM_PROGRAM_ID {
            return Err(ProgramError::IncorrectProgramId);
        }
        Ok(acc)
    }

    /// The Clock sysvar, wrapped as the ledger's time source.
    #[inline(always)]
    pub fn next_clock(&mut self) -> Result<SysvarClock<'a>, ProgramError> {
        SysvarClock::new(self.next()?)
    }
}
