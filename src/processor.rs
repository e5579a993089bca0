use pinocchio::{
    cpi::{Seed, Signer},
    error::ProgramError,
    AccountView, Address, ProgramResult,
};

use crate::accounts::AccountList;
use crate::beneficiary::{read_authority, read_completed, Beneficiary, BeneficiaryProgram};
use crate::config::LedgerConfig;
use crate::error::StakerError;
use crate::instruction::StakerInstruction;
use crate::math::{checked_add, checked_sub, rent_exempt_min};
use crate::pda::{self, check_pda, STAKE_SEED};
use crate::state::{pool_value, Ledger, StakeRecord, LEDGER_LEN, STAKE_RECORD_LEN};
use crate::system;
use crate::{require, require_keys_eq, trace};

/// Route to the correct handler based on the first byte of instruction data.
pub fn process(
    program_id: &Address,
    accounts: &[AccountView],
    instruction_data: &[u8],
) -> ProgramResult {
    match StakerInstruction::unpack(instruction_data)? {
        StakerInstruction::Initialize(config) => process_initialize(program_id, accounts, &config),
        StakerInstruction::Stake { amount } => process_stake(program_id, accounts, amount),
        StakerInstruction::Withdraw => process_withdraw(program_id, accounts),
        StakerInstruction::Execute => process_execute(program_id, accounts),
        StakerInstruction::ResetDeadlines => process_reset_deadlines(program_id, accounts),
    }
}

// ── Initialize ───────────────────────────────────────────────────────────────
//
// Accounts:
//   0. [signer, writable] payer
//   1. [signer, writable] ledger (uninitialized keypair)
//   2. [executable]       beneficiary_program
//   3. []                 beneficiary_state (owned by beneficiary_program)
//   4. []                 system_program
//   5. []                 clock sysvar
//
// The beneficiary state must already name this ledger's authority PDA and
// must not be completed.

fn process_initialize(
    program_id: &Address,
    accounts: &[AccountView],
    config: &LedgerConfig,
) -> ProgramResult {
    let mut accs = AccountList::new(accounts);
    let payer = accs.next_participant()?;
    let ledger = accs.next_new_account()?;
    let beneficiary_program = accs.next_executable()?;
    let beneficiary_state = accs.next()?;
    let _system = accs.next_system_program()?;
    let clock = accs.next_clock()?;

    config.validate()?;
    require!(
        beneficiary_state.owned_by(beneficiary_program.address()),
        StakerError::BeneficiaryMismatch
    );

    let (authority, authority_bump) = pda::ledger_authority(ledger.address(), program_id);
    {
        let data = beneficiary_state.try_borrow()?;
        let stored = read_authority(&data).map_err(|_| StakerError::BeneficiaryMismatch)?;
        require_keys_eq!(&stored, &authority, StakerError::BeneficiaryMismatch);
        require!(!read_completed(&data)?, StakerError::BeneficiaryCompleted);
    }

    system::create_account(
        payer,
        ledger,
        program_id,
        rent_exempt_min(LEDGER_LEN),
        LEDGER_LEN as u64,
    )?;

    let mut raw = ledger.try_borrow_mut()?;
    let opened = Ledger::open(
        &mut *raw,
        beneficiary_program.address(),
        beneficiary_state.address(),
        config,
        authority_bump,
        &clock,
    )?;
    trace!(
        "Ledger opened: withdraw at {}, claim at {}",
        opened.withdrawal_deadline(),
        opened.claim_deadline()
    );

    Ok(())
}

// ── Stake ────────────────────────────────────────────────────────────────────
//
// Accounts:
//   0. [signer, writable] participant
//   1. [writable]         ledger
//   2. [writable]         stake_record PDA ["stake", ledger, participant]
//   3. []                 system_program
//
// Data (after tag byte):
//   [0..8] u64 amount
//
// The first stake creates the record, paid for by the participant.

fn process_stake(program_id: &Address, accounts: &[AccountView], amount: u64) -> ProgramResult {
    let mut accs = AccountList::new(accounts);
    let participant = accs.next_participant()?;
    let ledger = accs.next_ledger(program_id)?;
    let stake_record = accs.next_writable()?;
    let _system = accs.next_system_program()?;

    if stake_record.is_data_empty() {
        create_stake_record(program_id, participant, ledger, stake_record)?;
    }

    let balance = {
        let mut raw = ledger.try_borrow_mut()?;
        let mut state = Ledger::load(&mut *raw)?;
        let mut record_raw = stake_record.try_borrow_mut()?;
        let mut record = load_stake_record(program_id, stake_record, &mut record_raw, ledger, participant)?;
        state.stake(&mut record, amount)?
    }; // borrows dropped before the CPI touches the ledger

    system::transfer(participant, ledger, amount)?;
    trace!("Staked {} lamports, balance {}", amount, balance);

    Ok(())
}

fn create_stake_record(
    program_id: &Address,
    participant: &AccountView,
    ledger: &AccountView,
    stake_record: &AccountView,
) -> ProgramResult {
    let (expected, bump) = pda::stake_record(ledger.address(), participant.address(), program_id);
    check_pda(stake_record, &expected)?;

    let bump_seed = [bump];
    let seeds = [
        Seed::from(STAKE_SEED),
        Seed::from(ledger.address().as_array()),
        Seed::from(participant.address().as_array()),
        Seed::from(&bump_seed),
    ];
    system::create_pda_account(
        participant,
        stake_record,
        program_id,
        rent_exempt_min(STAKE_RECORD_LEN),
        STAKE_RECORD_LEN as u64,
        &[Signer::from(&seeds)],
    )?;

    let mut raw = stake_record.try_borrow_mut()?;
    StakeRecord::initialize(&mut *raw, ledger.address(), participant.address(), bump)?;
    Ok(())
}

/// Load a record this program created for `participant` in `ledger`.
fn load_stake_record<'d>(
    program_id: &Address,
    stake_record: &AccountView,
    data: &'d mut [u8],
    ledger: &AccountView,
    participant: &AccountView,
) -> Result<StakeRecord<&'d mut [u8]>, ProgramError> {
    if !stake_record.owned_by(program_id) {
        return Err(ProgramError::IncorrectProgramId);
    }
    let record = StakeRecord::load(data)?;
    require_keys_eq!(&record.ledger(), ledger.address(), ProgramError::InvalidSeeds);
    require_keys_eq!(&record.participant(), participant.address(), ProgramError::InvalidSeeds);
    Ok(record)
}

// ── Withdraw ─────────────────────────────────────────────────────────────────
//
// Accounts:
//   0. [signer, writable] participant
//   1. [writable]         ledger
//   2. [writable]         stake_record PDA (may not exist yet)
//   3. []                 clock sysvar
//
// The record stays open at zero balance so a later stake reuses it.

fn process_withdraw(program_id: &Address, accounts: &[AccountView]) -> ProgramResult {
    let mut accs = AccountList::new(accounts);
    let participant = accs.next_participant()?;
    let ledger = accs.next_ledger(program_id)?;
    let stake_record = accs.next_writable()?;
    let clock = accs.next_clock()?;

    let (amount, data_len) = {
        let mut raw = ledger.try_borrow_mut()?;
        let data_len = raw.len();
        let mut state = Ledger::load(&mut *raw)?;
        let amount = if stake_record.is_data_empty() {
            state.withdraw(&clock, None)?
        } else {
            let mut record_raw = stake_record.try_borrow_mut()?;
            let mut record =
                load_stake_record(program_id, stake_record, &mut record_raw, ledger, participant)?;
            state.withdraw(&clock, Some(&mut record))?
        };
        (amount, data_len)
    };

    // Balance is already zeroed; the payout is the last thing that happens.
    require!(
        pool_value(ledger.lamports(), data_len) >= amount,
        StakerError::TransferFailed
    );
    let new_ledger_lamports = checked_sub(ledger.lamports(), amount)?;
    let new_participant_lamports = checked_add(participant.lamports(), amount)?;
    ledger.set_lamports(new_ledger_lamports);
    participant.set_lamports(new_participant_lamports);
    trace!("Withdrew {} lamports", amount);

    Ok(())
}

// ── Execute ──────────────────────────────────────────────────────────────────
//
// Accounts:
//   0. [writable]   ledger
//   1. [writable]   beneficiary_state
//   2. [executable] beneficiary_program
//   3. []           ledger authority PDA ["authority", ledger]
//   4. []           clock sysvar
//
// Anyone may call. Sweeps every lamport above the rent floor, including
// lamports that arrived outside of Stake. Checks run in this order:
// beneficiary accounts, authority PDA, claim deadline, executed flag,
// beneficiary completed flag.

fn process_execute(program_id: &Address, accounts: &[AccountView]) -> ProgramResult {
    let mut accs = AccountList::new(accounts);
    let ledger = accs.next_ledger(program_id)?;
    let beneficiary_state = accs.next_writable()?;
    let beneficiary_program = accs.next_executable()?;
    let authority = accs.next()?;
    let clock = accs.next_clock()?;

    let mut beneficiary = BeneficiaryProgram {
        pool: ledger,
        program: beneficiary_program,
        state: beneficiary_state,
        authority,
        authority_bump: 0,
    };

    let pool = {
        let mut raw = ledger.try_borrow_mut()?;
        let data_len = raw.len();
        let mut state = Ledger::load(&mut *raw)?;
        require_keys_eq!(
            beneficiary_program.address(),
            &state.beneficiary_program(),
            StakerError::BeneficiaryMismatch
        );
        require_keys_eq!(
            beneficiary_state.address(),
            &state.beneficiary_state(),
            StakerError::BeneficiaryMismatch
        );
        beneficiary.authority_bump = state.authority_bump();
        check_pda(
            authority,
            &pda::ledger_authority_with_bump(ledger.address(), beneficiary.authority_bump, program_id),
        )?;
        state.check_execute(&clock)?;
        require!(!beneficiary.is_completed()?, StakerError::BeneficiaryCompleted);
        state.mark_executed();
        pool_value(ledger.lamports(), data_len)
    };

    beneficiary.complete(pool)?;
    trace!("Executed: {} lamports sent to beneficiary", pool);

    Ok(())
}

// ── ResetDeadlines ───────────────────────────────────────────────────────────
//
// Accounts:
//   0. [writable] ledger
//   1. []         clock sysvar
//
// No signer: any caller may restart the cycle.

fn process_reset_deadlines(program_id: &Address, accounts: &[AccountView]) -> ProgramResult {
    let mut accs = AccountList::new(accounts);
    let ledger = accs.next_ledger(program_id)?;
    let clock = accs.next_clock()?;

    let mut raw = ledger.try_borrow_mut()?;
    let (withdrawal_deadline, claim_deadline) = Ledger::load(&mut *raw)?.reset_deadlines(&clock)?;
    trace!(
        "Deadlines reset: withdraw at {}, claim at {}",
        withdrawal_deadline,
        claim_deadline
    );

    Ok(())
}
