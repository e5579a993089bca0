//! Hand-built system program CPIs.

use pinocchio::{
    cpi::{self, Signer},
    instruction::{InstructionAccount, InstructionView},
    AccountView, Address, ProgramResult,
};

use crate::math::checked_sub;

/// The system program: where lamports come from and where rent goes.
pub const SYSTEM_PROGRAM_ID: Address = Address::new_from_array([0u8; 32]);

const IX_CREATE_ACCOUNT: u32 = 0;
const IX_ASSIGN: u32 = 1;
const IX_TRANSFER: u32 = 2;
const IX_ALLOCATE: u32 = 8;

/// CPI: create `new_account` with `space` bytes, funded by `payer` and owned by `owner`.
///
/// Both accounts must sign; used for the ledger, a fresh keypair.
pub fn create_account(
    payer: &AccountView,
    new_account: &AccountView,
    owner: &Address,
    lamports: u64,
    space: u64,
) -> ProgramResult {
    let ix = InstructionView {
        program_id: &SYSTEM_PROGRAM_ID,
        accounts: &[
            InstructionAccount::writable_signer(payer.address()),
            InstructionAccount::writable_signer(new_account.address()),
        ],
        data: &create_account_data(lamports, space, owner),
    };

    cpi::invoke(&ix, &[payer, new_account])
}

/// CPI: create a PDA `new_account` that signs through `signers`.
///
/// An address already holding lamports cannot go through `CreateAccount`,
/// so it is topped up to `lamports`, then allocated and assigned instead.
pub fn create_pda_account(
    payer: &AccountView,
    new_account: &AccountView,
    owner: &Address,
    lamports: u64,
    space: u64,
    signers: &[Signer],
) -> ProgramResult {
    let current = new_account.lamports();
    if current == 0 {
        let ix = InstructionView {
            program_id: &SYSTEM_PROGRAM_ID,
            accounts: &[
                InstructionAccount::writable_signer(payer.address()),
                InstructionAccount::writable_signer(new_account.address()),
            ],
            data: &create_account_data(lamports, space, owner),
        };
        return cpi::invoke_signed(&ix, &[payer, new_account], signers);
    }

    if current < lamports {
        transfer(payer, new_account, checked_sub(lamports, current)?)?;
    }
    let allocate = InstructionView {
        program_id: &SYSTEM_PROGRAM_ID,
        accounts: &[InstructionAccount::writable_signer(new_account.address())],
        data: &allocate_data(space),
    };
    cpi::invoke_signed(&allocate, &[new_account], signers)?;
    let assign = InstructionView {
        program_id: &SYSTEM_PROGRAM_ID,
        accounts: &[InstructionAccount::writable_signer(new_account.address())],
        data: &assign_data(owner),
    };
    cpi::invoke_signed(&assign, &[new_account], signers)
}

/// CPI: move `lamports` from a system-owned signer into `to`.
pub fn transfer(from: &AccountView, to: &AccountView, lamports: u64) -> ProgramResult {
    let ix = InstructionView {
        program_id: &SYSTEM_PROGRAM_ID,
        accounts: &[
            InstructionAccount::writable_signer(from.address()),
            InstructionAccount::writable(to.address()),
        ],
        data: &transfer_data(lamports),
    };

    cpi::invoke(&ix, &[from, to])
}

/// 4 + 8 + 8 + 32 = 52 bytes.
fn create_account_data(lamports: u64, space: u64, owner: &Address) -> [u8; 52] {
    let mut data = [0u8; 52];
    data[0..4].copy_from_slice(&IX_CREATE_ACCOUNT.to_le_bytes());
    data[4..12].copy_from_slice(&lamports.to_le_bytes());
    data[12..20].copy_from_slice(&space.to_le_bytes());
    data[20..52].copy_from_slice(owner.as_array());
    data
}

/// 4 + 8 = 12 bytes.
fn allocate_data(space: u64) -> [u8; 12] {
    let mut data = [0u8; 12];
    data[0..4].copy_from_slice(&IX_ALLOCATE.to_le_bytes());
    data[4..12].copy_from_slice(&space.to_le_bytes());
    data
}

/// 4 + 32 = 36 bytes.
fn assign_data(owner: &Address) -> [u8; 36] {
    let mut data = [0u8; 36];
    data[0..4].copy_from_slice(&IX_ASSIGN.to_le_bytes());
    data[4..36].copy_from_slice(owner.as_array());
    data
}

/// 4 + 8 = 12 bytes.
fn transfer_data(lamports: u64) -> [u8; 12] {
    let mut data = [0u8; 12];
    data[0..4].copy_from_slice(&IX_TRANSFER.to_le_bytes());
    data[4..12].copy_from_slice(&lamports.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_data_uses_system_tag_two() {
        let data = transfer_data(120_000_000);
        assert_eq!(&data[0..4], &[2, 0, 0, 0]);
        assert_eq!(u64::from_le_bytes(data[4..12].try_into().unwrap()), 120_000_000);
    }

    #[test]
    fn create_account_data_layout() {
        let owner = Address::new_from_array([9u8; 32]);
        let data = create_account_data(5, 232, &owner);
        assert_eq!(&data[0..4], &[0, 0, 0, 0]);
        assert_eq!(u64::from_le_bytes(data[4..12].try_into().unwrap()), 5);
        assert_eq!(u64::from_le_bytes(data[12..20].try_into().unwrap()), 232);
        assert_eq!(&data[20..52], &[9u8; 32]);
    }

    #[test]
    fn allocate_and_assign_tags() {
        let allocate = allocate_data(88);
        assert_eq!(&allocate[0..4], &[8, 0, 0, 0]);
        assert_eq!(u64::from_le_bytes(allocate[4..12].try_into().unwrap()), 88);

        let assign = assign_data(&Address::new_from_array([3u8; 32]));
        assert_eq!(&assign[0..4], &[1, 0, 0, 0]);
        assert_eq!(&assign[4..36], &[3u8; 32]);
    }
}
