#![cfg_attr(target_os = "solana", no_std)]
//! **staker-beneficiary** - The program a staker ledger sweeps its pool into.
//!
//! It does one thing: accept a single `Complete` call signed by the
//! authority named at initialization, record what it was told it received,
//! and flip a `completed` flag that anyone can read.
//! The staker reaches it purely through instruction bytes and the state
//! layout in [`state`]; neither crate links the other.
//!
//! Instructions:
//! - `0`: Initialize: create the state account bound to an authority, with `completed = false`
//! - `1`: Complete: authority-signed; mark completed and add `amount` to `total_received`

pub mod processor;
pub mod state;

#[cfg(all(feature = "bpf-entrypoint", target_os = "solana"))]
mod entrypoint {
    use pinocchio::{program_entrypoint, no_allocator, nostd_panic_handler, AccountView, Address, ProgramResult};

    program_entrypoint!(process_instruction);
    no_allocator!();
    nostd_panic_handler!();

    pub fn process_instruction(
        program_id: &Address,
        accounts: &[AccountView],
        instruction_data: &[u8],
    ) -> ProgramResult {
        crate::processor::process(program_id, accounts, instruction_data)
    }
}
