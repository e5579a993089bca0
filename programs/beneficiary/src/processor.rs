use pinocchio::{
    cpi,
    error::ProgramError,
    instruction::{InstructionAccount, InstructionView},
    AccountView, Address, ProgramResult,
};

use crate::state::*;

const IX_INITIALIZE: u8 = 0;
const IX_COMPLETE: u8 = 1;

const SYSTEM_PROGRAM_ID: Address = Address::new_from_array([0u8; 32]);

pub fn process(
    program_id: &Address,
    accounts: &[AccountView],
    instruction_data: &[u8],
) -> ProgramResult {
    let (&tag, args) = instruction_data
        .split_first()
        .ok_or(ProgramError::InvalidInstructionData)?;

    match tag {
        IX_INITIALIZE => process_initialize(program_id, accounts, args),
        IX_COMPLETE => process_complete(program_id, accounts, args),
        _ => Err(ProgramError::InvalidInstructionData),
    }
}

// ── Initialize ───────────────────────────────────────────────────────────────
//
// Accounts:
//   0. [signer, writable] payer
//   1. [signer, writable] state (uninitialized keypair)
//   2. []                 system_program
//
// Data (after tag byte):
//   [0..32] Address authority

fn process_initialize(program_id: &Address, accounts: &[AccountView], args: &[u8]) -> ProgramResult {
    let [payer, state, system, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    if !payer.is_signer() || !state.is_signer() {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if !state.is_data_empty() {
        return Err(ProgramError::AccountAlreadyInitialized);
    }
    if *system.address() != SYSTEM_PROGRAM_ID {
        return Err(ProgramError::IncorrectProgramId);
    }
    let authority_bytes: [u8; 32] = args
        .try_into()
        .map_err(|_| ProgramError::InvalidInstructionData)?;
    let authority = Address::new_from_array(authority_bytes);

    let lamports = (128u64 + BENEFICIARY_LEN as u64) * 6960;
    create_account(payer, state, program_id, lamports, BENEFICIARY_LEN as u64)?;

    let mut raw = state.try_borrow_mut()?;
    init_state(&mut raw, &authority)
}

// ── Complete ─────────────────────────────────────────────────────────────────
//
// Accounts:
//   0. [writable] state
//   1. [signer]   authority recorded at Initialize
//
// Data (after tag byte):
//   [0..8] u64 amount

fn process_complete(program_id: &Address, accounts: &[AccountView], args: &[u8]) -> ProgramResult {
    let [state, authority, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    if !state.is_writable() {
        return Err(ProgramError::InvalidArgument);
    }
    if !authority.is_signer() {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if !state.owned_by(program_id) {
        return Err(ProgramError::IncorrectProgramId);
    }
    let amount_bytes: [u8; 8] = args
        .try_into()
        .map_err(|_| ProgramError::InvalidInstructionData)?;
    let amount = u64::from_le_bytes(amount_bytes);

    let mut raw = state.try_borrow_mut()?;
    check_authority(&raw, authority.address())?;
    complete(&mut raw, amount)?;

    #[cfg(feature = "log")]
    pinocchio_log::log!("Beneficiary completed with {} lamports", amount);

    Ok(())
}

fn create_account(
    payer: &AccountView,
    new_account: &AccountView,
    owner: &Address,
    lamports: u64,
    space: u64,
) -> ProgramResult {
    let mut data = [0u8; 52];
    data[4..12].copy_from_slice(&lamports.to_le_bytes());
    data[12..20].copy_from_slice(&space.to_le_bytes());
    data[20..52].copy_from_slice(owner.as_array());

    let ix = InstructionView {
        program_id: &SYSTEM_PROGRAM_ID,
        accounts: &[
            InstructionAccount::writable_signer(payer.address()),
            InstructionAccount::writable_signer(new_account.address()),
        ],
        data: &data,
    };

    cpi::invoke(&ix, &[payer, new_account])
}
