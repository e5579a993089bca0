//! The external process that receives the pool.
//!
//! The ledger only knows a narrow capability: hand over value and flip a
//! completed flag, plus a read-only query on that flag. On-chain this is a
//! separate program reached via CPI; its state account layout is matched
//! by bytes, the staker does not link against it.
//!
//! The beneficiary accepts `Complete` only when signed by the authority
//! stored in its state. For a staker ledger that authority is the ledger's
//! authority PDA, so no one but the ledger can complete it.

use pinocchio::{
    cpi::{self, Seed, Signer},
    error::ProgramError,
    instruction::{InstructionAccount, InstructionView},
    AccountView, Address, ProgramResult,
};

use crate::math::{checked_add, checked_sub};
use crate::pda::AUTHORITY_SEED;

/// Instruction tag of the beneficiary's `Complete`.
pub const IX_COMPLETE: u8 = 1;

/// Beneficiary state discriminator.
pub const BENEFICIARY_DISC: u8 = 1;

/// Minimum beneficiary state version carrying an authority.
pub const BENEFICIARY_VERSION: u8 = 2;

/// Size of the beneficiary state account.
pub const BENEFICIARY_LEN: usize = 48;

/// Header flag bit set once `Complete` has run.
pub const FLAG_COMPLETED: u8 = 0;

/// Offset of the authority allowed to call `Complete`.
pub const AUTHORITY_OFFSET: usize = 8;

/// Capability the ledger needs from its beneficiary.
pub trait Beneficiary {
    /// Transfer `amount` to the beneficiary and mark it completed.
    /// Not idempotent: the ledger calls it at most once.
    fn complete(&self, amount: u64) -> ProgramResult;

    /// Whether `complete` has already run.
    fn is_completed(&self) -> Result<bool, ProgramError>;
}

/// Beneficiary program reached through CPI.
///
/// `pool` is the ledger account the lamports are taken from; it must be
/// owned by the calling program so its lamports can be debited directly.
/// `authority` is the ledger's authority PDA and `authority_bump` its
/// stored bump; together they sign the `Complete` call.
pub struct BeneficiaryProgram<'a> {
    pub pool: &'a AccountView,
    pub program: &'a AccountView,
    pub state: &'a AccountView,
    pub authority: &'a AccountView,
    pub authority_bump: u8,
}

impl Beneficiary for BeneficiaryProgram<'_> {
    fn complete(&self, amount: u64) -> ProgramResult {
        let mut data = [0u8; 9];
        data[0] = IX_COMPLETE;
        data[1..9].copy_from_slice(&amount.to_le_bytes());

        let ix = InstructionView {
            program_id: self.program.address(),
            accounts: &[
                InstructionAccount::writable(self.state.address()),
                InstructionAccount::readonly_signer(self.authority.address()),
            ],
            data: &data,
        };
        let bump = [self.authority_bump];
        let seeds = [
            Seed::from(AUTHORITY_SEED),
            Seed::from(self.pool.address().as_array()),
            Seed::from(&bump),
        ];
        cpi::invoke_signed(&ix, &[self.state, self.authority], &[Signer::from(&seeds)])?;

        // Value moves after the call returns, as the last action.
        let new_pool = checked_sub(self.pool.lamports(), amount)?;
        let new_state = checked_add(self.state.lamports(), amount)?;
        self.pool.set_lamports(new_pool);
        self.state.set_lamports(new_state);
        Ok(())
    }

    fn is_completed(&self) -> Result<bool, ProgramError> {
        if !self.state.owned_by(self.program.address()) {
            return Err(ProgramError::IncorrectProgramId);
        }
        let data = self.state.try_borrow()?;
        read_completed(&data)
    }
}

fn check_state(data: &[u8]) -> Result<(), ProgramError> {
    if data.len() < BENEFICIARY_LEN {
        return Err(ProgramError::AccountDataTooSmall);
    }
    if data[0] != BENEFICIARY_DISC || data[1] < BENEFICIARY_VERSION {
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

/// Read the completed flag from raw beneficiary state data.
#[inline(always)]
pub fn read_completed(data: &[u8]) -> Result<bool, ProgramError> {
    check_state(data)?;
    Ok((data[2] >> FLAG_COMPLETED) & 1 == 1)
}

/// Read the authority allowed to complete the beneficiary.
#[inline(always)]
pub fn read_authority(data: &[u8]) -> Result<Address, ProgramError> {
    check_state(data)?;
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[AUTHORITY_OFFSET..AUTHORITY_OFFSET + 32]);
    Ok(Address::new_from_array(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(completed: bool) -> [u8; BENEFICIARY_LEN] {
        let mut data = [0u8; BENEFICIARY_LEN];
        data[0] = BENEFICIARY_DISC;
        data[1] = BENEFICIARY_VERSION;
        data[2] = completed as u8;
        data[AUTHORITY_OFFSET..AUTHORITY_OFFSET + 32].fill(0xA7);
        data
    }

    #[test]
    fn reads_completed_flag() {
        assert_eq!(read_completed(&state(false)), Ok(false));
        assert_eq!(read_completed(&state(true)), Ok(true));
    }

    #[test]
    fn reads_authority() {
        assert_eq!(
            read_authority(&state(false)),
            Ok(Address::new_from_array([0xA7; 32]))
        );
    }

    #[test]
    fn rejects_other_accounts() {
        let mut data = state(false);
        data[0] = 7;
        assert_eq!(read_completed(&data), Err(ProgramError::InvalidAccountData));

        let mut data = state(false);
        data[1] = 1;
        assert_eq!(read_authority(&data), Err(ProgramError::InvalidAccountData));

        assert_eq!(read_completed(&[1]), Err(ProgramError::AccountDataTooSmall));
    }
}
