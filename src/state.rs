//! Account layouts and zero-copy accessors.
//!
//! Ledger account:
//!
//! ```text
//! [0]        u8       discriminator   (= 1)
//! [1]        u8       version         (= 2)
//! [2]        u8       flags           (bit 0 = executed)
//! [3]        u8       reserved        (0)
//! [4..8]     u32      data_len        (payload bytes after the header)
//! --- payload ---
//! [8..40]    Address  beneficiary_program
//! [40..72]   Address  beneficiary_state
//! [72..80]   i64      withdrawal_deadline
//! [80..88]   i64      claim_deadline
//! [88..96]   i64      withdrawal_window
//! [96..104]  i64      claim_window
//! [104..112] u64      total_staked
//! [112]      u8       authority_bump
//! [113..120] padding
//! ```
//!
//! Stake record, one PDA per `(ledger, participant)`:
//!
//! ```text
//! [0]        u8       discriminator   (= 2)
//! [1]        u8       version         (= 1)
//! [2..4]     reserved
//! [4..8]     u32      data_len
//! --- payload ---
//! [8..40]    Address  ledger
//! [40..72]   Address  participant
//! [72..80]   u64      balance
//! [80]       u8       bump
//! [81..88]   padding
//! ```
//!
//! The pool itself is not stored: it is whatever the ledger holds above its
//! rent-exempt floor (see [`pool_value`]).

use pinocchio::{error::ProgramError, Address};

use crate::config::LedgerConfig;
use crate::math::rent_exempt_min;

/// Size of the account header, in bytes.
pub const HEADER_LEN: usize = 8;

/// Ledger account discriminator.
pub const LEDGER_DISC: u8 = 1;

/// Ledger layout version.
pub const LEDGER_VERSION: u8 = 2;

/// Set once the pool has been handed to the beneficiary. Never cleared.
pub const FLAG_EXECUTED: u8 = 0;

pub const BENEFICIARY_PROGRAM_OFFSET: usize = 8;
pub const BENEFICIARY_STATE_OFFSET: usize = 40;
pub const WITHDRAWAL_DEADLINE_OFFSET: usize = 72;
pub const CLAIM_DEADLINE_OFFSET: usize = 80;
pub const WITHDRAWAL_WINDOW_OFFSET: usize = 88;
pub const CLAIM_WINDOW_OFFSET: usize = 96;
pub const TOTAL_STAKED_OFFSET: usize = 104;
pub const AUTHORITY_BUMP_OFFSET: usize = 112;

/// Total size of the ledger account.
pub const LEDGER_LEN: usize = 120;

/// Stake record discriminator.
pub const STAKE_RECORD_DISC: u8 = 2;

/// Stake record layout version.
pub const STAKE_RECORD_VERSION: u8 = 1;

pub const RECORD_LEDGER_OFFSET: usize = 8;
pub const RECORD_PARTICIPANT_OFFSET: usize = 40;
pub const RECORD_BALANCE_OFFSET: usize = 72;
pub const RECORD_BUMP_OFFSET: usize = 80;

/// Total size of a stake record account.
pub const STAKE_RECORD_LEN: usize = 88;

const FLAGS_OFFSET: usize = 2;
const DATA_LEN_OFFSET: usize = 4;

/// Lamports held above the rent floor: the stakeable pool, including any
/// untracked transfers made straight into the account.
#[inline(always)]
pub fn pool_value(lamports: u64, data_len: usize) -> u64 {
    lamports.saturating_sub(rent_exempt_min(data_len))
}

/// Which part of a deadline cycle a timestamp falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before the withdrawal deadline: stakes are locked.
    Locked,
    /// Between the deadlines: participants may withdraw.
    WithdrawOpen,
    /// At or after the claim deadline: only `execute` may move the pool.
    Claimable,
}

/// Zero-copy view over ledger account data.
///
/// `D` is `&[u8]` for read-only access or `&mut [u8]` when the caller holds
/// a mutable borrow. Length and header are validated once in [`Ledger::load`];
/// accessors index without re-checking.
pub struct Ledger<D> {
    data: D,
}

impl<D: AsRef<[u8]>> Ledger<D> {
    /// Validate header and size, then wrap the data.
    pub fn load(data: D) -> Result<Self, ProgramError> {
        check_header(data.as_ref(), LEDGER_DISC, LEDGER_VERSION, LEDGER_LEN)?;
        Ok(Self { data })
    }

    #[inline(always)]
    fn raw(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn beneficiary_program(&self) -> Address {
        address_at(self.raw(), BENEFICIARY_PROGRAM_OFFSET)
    }

    pub fn beneficiary_state(&self) -> Address {
        address_at(self.raw(), BENEFICIARY_STATE_OFFSET)
    }

    /// Earliest timestamp at which participants may reclaim their stake.
    pub fn withdrawal_deadline(&self) -> i64 {
        i64::from_le_bytes(bytes_at(self.raw(), WITHDRAWAL_DEADLINE_OFFSET))
    }

    /// Earliest timestamp at which the pool may be executed; withdrawals
    /// close at this instant.
    pub fn claim_deadline(&self) -> i64 {
        i64::from_le_bytes(bytes_at(self.raw(), CLAIM_DEADLINE_OFFSET))
    }

    pub fn config(&self) -> LedgerConfig {
        LedgerConfig {
            withdrawal_window: i64::from_le_bytes(bytes_at(self.raw(), WITHDRAWAL_WINDOW_OFFSET)),
            claim_window: i64::from_le_bytes(bytes_at(self.raw(), CLAIM_WINDOW_OFFSET)),
        }
    }

    /// Sum of all tracked balances. Can be below the pool when lamports
    /// arrive outside of `stake`.
    pub fn total_staked(&self) -> u64 {
        u64::from_le_bytes(bytes_at(self.raw(), TOTAL_STAKED_OFFSET))
    }

    /// Bump of the ledger authority PDA that signs the beneficiary CPI.
    pub fn authority_bump(&self) -> u8 {
        self.raw()[AUTHORITY_BUMP_OFFSET]
    }

    pub fn is_executed(&self) -> bool {
        (self.raw()[FLAGS_OFFSET] >> FLAG_EXECUTED) & 1 == 1
    }

    pub fn phase(&self, now: i64) -> Phase {
        if now < self.withdrawal_deadline() {
            Phase::Locked
        } else if now < self.claim_deadline() {
            Phase::WithdrawOpen
        } else {
            Phase::Claimable
        }
    }
}

impl<D: AsRef<[u8]> + AsMut<[u8]>> Ledger<D> {
    /// Write a fresh ledger into account data.
    pub fn initialize(
        mut data: D,
        beneficiary_program: &Address,
        beneficiary_state: &Address,
        config: &LedgerConfig,
        authority_bump: u8,
        withdrawal_deadline: i64,
        claim_deadline: i64,
    ) -> Result<Self, ProgramError> {
        let raw = data.as_mut();
        write_header(raw, LEDGER_DISC, LEDGER_VERSION, LEDGER_LEN)?;
        raw[BENEFICIARY_PROGRAM_OFFSET..BENEFICIARY_PROGRAM_OFFSET + 32]
            .copy_from_slice(beneficiary_program.as_array());
        raw[BENEFICIARY_STATE_OFFSET..BENEFICIARY_STATE_OFFSET + 32]
            .copy_from_slice(beneficiary_state.as_array());
        raw[WITHDRAWAL_WINDOW_OFFSET..WITHDRAWAL_WINDOW_OFFSET + 8]
            .copy_from_slice(&config.withdrawal_window.to_le_bytes());
        raw[CLAIM_WINDOW_OFFSET..CLAIM_WINDOW_OFFSET + 8]
            .copy_from_slice(&config.claim_window.to_le_bytes());
        raw[AUTHORITY_BUMP_OFFSET] = authority_bump;

        let mut ledger = Self { data };
        ledger.set_deadlines(withdrawal_deadline, claim_deadline);
        Ok(ledger)
    }

    #[inline(always)]
    fn raw_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    pub(crate) fn set_deadlines(&mut self, withdrawal_deadline: i64, claim_deadline: i64) {
        let raw = self.raw_mut();
        raw[WITHDRAWAL_DEADLINE_OFFSET..WITHDRAWAL_DEADLINE_OFFSET + 8]
            .copy_from_slice(&withdrawal_deadline.to_le_bytes());
        raw[CLAIM_DEADLINE_OFFSET..CLAIM_DEADLINE_OFFSET + 8]
            .copy_from_slice(&claim_deadline.to_le_bytes());
    }

    pub(crate) fn set_total_staked(&mut self, total: u64) {
        self.raw_mut()[TOTAL_STAKED_OFFSET..TOTAL_STAKED_OFFSET + 8]
            .copy_from_slice(&total.to_le_bytes());
    }

    pub(crate) fn mark_executed(&mut self) {
        self.raw_mut()[FLAGS_OFFSET] |= 1 << FLAG_EXECUTED;
    }
}

/// Zero-copy view over one participant's stake record.
pub struct StakeRecord<D> {
    data: D,
}

impl<D: AsRef<[u8]>> StakeRecord<D> {
    pub fn load(data: D) -> Result<Self, ProgramError> {
        check_header(
            data.as_ref(),
            STAKE_RECORD_DISC,
            STAKE_RECORD_VERSION,
            STAKE_RECORD_LEN,
        )?;
        Ok(Self { data })
    }

    pub fn ledger(&self) -> Address {
        address_at(self.data.as_ref(), RECORD_LEDGER_OFFSET)
    }

    pub fn participant(&self) -> Address {
        address_at(self.data.as_ref(), RECORD_PARTICIPANT_OFFSET)
    }

    pub fn balance(&self) -> u64 {
        u64::from_le_bytes(bytes_at(self.data.as_ref(), RECORD_BALANCE_OFFSET))
    }

    pub fn bump(&self) -> u8 {
        self.data.as_ref()[RECORD_BUMP_OFFSET]
    }
}

impl<D: AsRef<[u8]> + AsMut<[u8]>> StakeRecord<D> {
    /// Write an empty record binding `participant` to `ledger`.
    pub fn initialize(
        mut data: D,
        ledger: &Address,
        participant: &Address,
        bump: u8,
    ) -> Result<Self, ProgramError> {
        let raw = data.as_mut();
        write_header(raw, STAKE_RECORD_DISC, STAKE_RECORD_VERSION, STAKE_RECORD_LEN)?;
        raw[RECORD_LEDGER_OFFSET..RECORD_LEDGER_OFFSET + 32].copy_from_slice(ledger.as_array());
        raw[RECORD_PARTICIPANT_OFFSET..RECORD_PARTICIPANT_OFFSET + 32]
            .copy_from_slice(participant.as_array());
        raw[RECORD_BUMP_OFFSET] = bump;
        Ok(Self { data })
    }

    pub(crate) fn set_balance(&mut self, balance: u64) {
        self.data.as_mut()[RECORD_BALANCE_OFFSET..RECORD_BALANCE_OFFSET + 8]
            .copy_from_slice(&balance.to_le_bytes());
    }
}

fn check_header(raw: &[u8], disc: u8, version: u8, len: usize) -> Result<(), ProgramError> {
    if raw.len() < len {
        return Err(ProgramError::AccountDataTooSmall);
    }
    if raw[0] != disc || raw[1] < version {
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

fn write_header(raw: &mut [u8], disc: u8, version: u8, len: usize) -> Result<(), ProgramError> {
    if raw.len() < len {
        return Err(ProgramError::AccountDataTooSmall);
    }
    raw.fill(0);
    raw[0] = disc;
    raw[1] = version;
    let payload_len = (len - HEADER_LEN) as u32;
    raw[DATA_LEN_OFFSET..HEADER_LEN].copy_from_slice(&payload_len.to_le_bytes());
    Ok(())
}

#[inline(always)]
fn address_at(data: &[u8], offset: usize) -> Address {
    Address::new_from_array(bytes_at(data, offset))
}

/// Copy `N` bytes starting at `offset`. Callers stay inside the length
/// checked on load.
#[inline(always)]
fn bytes_at<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[offset..offset + N]);
    out
}
