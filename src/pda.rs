//! Program-derived addresses owned by the staker.
//!
//! | PDA | Seeds | Role |
//! |---|---|---|
//! | ledger authority | `["authority", ledger]` | signs the beneficiary `Complete` CPI |
//! | stake record | `["stake", ledger, participant]` | one participant's balance |
//!
//! # On-chain vs off-chain
//!
//! - [`find_address`] uses the `find_program_address` syscall to search for
//!   the canonical bump. Off-chain there is no curve check available, so it
//!   settles on bump `255` and derives with it; host tests agree with
//!   themselves, not with a validator.
//! - [`derive_address`] hashes seeds with a known bump (no curve check).
//!   On-chain it uses the sha256 syscall, off-chain the pure-Rust
//!   `derive_address_const`.

use pinocchio::{error::ProgramError, AccountView, Address};

pub const AUTHORITY_SEED: &[u8] = b"authority";
pub const STAKE_SEED: &[u8] = b"stake";

/// Derive a PDA from `seeds` and a known `bump`.
#[inline(always)]
pub fn derive_address<const N: usize>(
    seeds: &[&[u8]; N],
    bump: u8,
    program_id: &Address,
) -> Address {
    #[cfg(target_os = "solana")]
    let bytes = pinocchio_pubkey::derive_address(seeds, Some(bump), program_id.as_array());
    #[cfg(not(target_os = "solana"))]
    let bytes = pinocchio_pubkey::derive_address_const(seeds, Some(bump), program_id.as_array());
    Address::new_from_array(bytes)
}

/// Find a PDA and its canonical bump.
#[inline(always)]
pub fn find_address<const N: usize>(seeds: &[&[u8]; N], program_id: &Address) -> (Address, u8) {
    #[cfg(target_os = "solana")]
    {
        Address::find_program_address(seeds, program_id)
    }
    #[cfg(not(target_os = "solana"))]
    {
        (derive_address(seeds, u8::MAX, program_id), u8::MAX)
    }
}

/// Authority PDA for `ledger`, with its bump.
#[inline(always)]
pub fn ledger_authority(ledger: &Address, program_id: &Address) -> (Address, u8) {
    let seeds: [&[u8]; 2] = [AUTHORITY_SEED, ledger.as_ref()];
    find_address(&seeds, program_id)
}

/// Authority PDA for `ledger` with a stored bump.
#[inline(always)]
pub fn ledger_authority_with_bump(ledger: &Address, bump: u8, program_id: &Address) -> Address {
    let seeds: [&[u8]; 2] = [AUTHORITY_SEED, ledger.as_ref()];
    derive_address(&seeds, bump, program_id)
}

/// Stake record PDA for `participant` in `ledger`, with its bump.
#[inline(always)]
pub fn stake_record(ledger: &Address, participant: &Address, program_id: &Address) -> (Address, u8) {
    let seeds: [&[u8]; 3] = [STAKE_SEED, ledger.as_ref(), participant.as_ref()];
    find_address(&seeds, program_id)
}

/// Verify `account` sits at `expected`.
#[inline(always)]
pub fn check_pda(account: &AccountView, expected: &Address) -> Result<(), ProgramError> {
    if *account.address() != *expected {
        return Err(ProgramError::InvalidSeeds);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> Address {
        Address::new_from_array([0x5A; 32])
    }

    #[test]
    fn stake_records_differ_per_participant_and_ledger() {
        let ledger = Address::new_from_array([1; 32]);
        let other_ledger = Address::new_from_array([2; 32]);
        let a = Address::new_from_array([0xA1; 32]);
        let b = Address::new_from_array([0xB0; 32]);

        let (ra, _) = stake_record(&ledger, &a, &program());
        let (rb, _) = stake_record(&ledger, &b, &program());
        let (ra2, _) = stake_record(&other_ledger, &a, &program());
        assert_ne!(ra, rb);
        assert_ne!(ra, ra2);
        assert_eq!(stake_record(&ledger, &a, &program()).0, ra);
    }

    #[test]
    fn authority_matches_stored_bump() {
        let ledger = Address::new_from_array([7; 32]);
        let (authority, bump) = ledger_authority(&ledger, &program());
        assert_eq!(ledger_authority_with_bump(&ledger, bump, &program()), authority);
        assert_ne!(
            ledger_authority_with_bump(&ledger, bump.wrapping_sub(1), &program()),
            authority
        );
        assert_ne!(authority, stake_record(&ledger, &ledger, &program()).0);
    }
}
