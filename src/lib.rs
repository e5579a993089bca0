#![cfg_attr(target_os = "solana", no_std)]
//! **staker** - A time-gated pooled-staking escrow program.
//!
//! Participants stake lamports into a shared ledger. Two deadlines split
//! every cycle into three phases:
//!
//! | Phase | Window | Allowed |
//! |---|---|---|
//! | Locked | `now < withdrawal_deadline` | `Stake` |
//! | WithdrawOpen | `withdrawal_deadline <= now < claim_deadline` | `Stake`, `Withdraw` |
//! | Claimable | `claim_deadline <= now` | `Stake`, `Execute` |
//!
//! `Execute` hands the whole pool to a beneficiary program and flips its
//! completed flag. It runs once; after it, staking and withdrawing are
//! closed for good. `ResetDeadlines` restarts the cycle from the current
//! time using the windows fixed at initialization.
//!
//! Instructions:
//! - `0`: Initialize: create the ledger and record the beneficiary
//! - `1`: Stake: add lamports to the caller's stake record, creating it on first use
//! - `2`: Withdraw: reclaim the caller's full balance inside the withdrawal window
//! - `3`: Execute: sweep the pool to the beneficiary after the claim deadline
//! - `4`: ResetDeadlines: restart the deadline cycle from now
//!
//! Each participant's balance lives in its own stake record PDA, so a ledger
//! takes any number of participants. The beneficiary only accepts
//! `Complete` signed by the ledger's authority PDA (see [`pda`]).
//!
//! The state machine lives in [`state`] and [`ledger`] and is host-testable
//! against any [`Clock`]; [`processor`] binds it to accounts, the Clock
//! sysvar and the beneficiary CPI.

mod logging;

pub mod accounts;
pub mod beneficiary;
pub mod clock;
pub mod config;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod math;
pub mod pda;
pub mod processor;
pub mod state;
pub mod system;

pub(crate) use logging::trace;

pub use beneficiary::{Beneficiary, BeneficiaryProgram};
pub use clock::{Clock, SysvarClock};
pub use config::LedgerConfig;
pub use error::StakerError;
pub use instruction::StakerInstruction;
pub use state::{Ledger, Phase, StakeRecord};

pub use pinocchio::{error::ProgramError, AccountView, Address, ProgramResult};

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
            .inspect_err(crate::error::log_failure)
    }
}

// ── Macros ───────────────────────────────────────────────────────────────────

/// Require a boolean condition: return `$err` (converted via `Into`) if false.
///
/// ```rust,ignore
/// require!(amount > 0, StakerError::InvalidAmount);
/// ```
#[macro_export]
macro_rules! require {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

/// Require two [`Address`] values to be equal.
///
/// ```rust,ignore
/// require_keys_eq!(state.address(), &stored_state, StakerError::BeneficiaryMismatch);
/// ```
#[macro_export]
macro_rules! require_keys_eq {
    ($a:expr, $b:expr, $err:expr) => {
        if *$a != *$b {
            return Err($err.into());
        }
    };
}
