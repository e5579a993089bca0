//! Host-side accounts laid out the way the runtime serializes them, so
//! `processor::process` can run against real `AccountView`s.
//!
//! CPIs are validated but not executed off-chain; harnesses apply the
//! callee's effects themselves.

#![allow(dead_code)]

use core::mem::size_of;

use pinocchio::account::{RuntimeAccount, NOT_BORROWED};
use pinocchio::{AccountView, Address};
use staker::clock::{Clock, SYSVAR_CLOCK};
use staker::math::rent_exempt_min;
use staker::state::{LEDGER_LEN, RECORD_BALANCE_OFFSET, STAKE_RECORD_LEN};
use staker::system::SYSTEM_PROGRAM_ID;
use staker::{pda, Ledger, LedgerConfig, ProgramError, StakeRecord};
use staker_beneficiary::state::{init_state, BENEFICIARY_LEN};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
pub const START: i64 = 1_700_000_000;

pub const PROGRAM_ID: Address = Address::new_from_array([0x5A; 32]);
pub const BENEFICIARY_ID: Address = Address::new_from_array([0xBE; 32]);
pub const LEDGER: Address = Address::new_from_array([0x1E; 32]);
pub const BENEFICIARY_STATE: Address = Address::new_from_array([0xBF; 32]);

const HEADER: usize = size_of::<RuntimeAccount>();

/// One account: a `RuntimeAccount` header followed by its data, in an
/// 8-byte aligned buffer that never reallocates.
pub struct TestAccount {
    _buf: Vec<u64>,
    raw: *mut RuntimeAccount,
}

impl TestAccount {
    pub fn new(address: Address, owner: Address, lamports: u64, data: &[u8]) -> Self {
        let words = (HEADER + data.len()).div_ceil(8);
        let mut buf = vec![0u64; words];
        let raw = buf.as_mut_ptr() as *mut RuntimeAccount;
        // SAFETY: `buf` is aligned for `RuntimeAccount` and long enough for
        // the header plus `data`.
        unsafe {
            raw.write(RuntimeAccount {
                borrow_state: NOT_BORROWED,
                is_signer: 0,
                is_writable: 0,
                executable: 0,
                resize_delta: 0,
                address,
                owner,
                lamports,
                data_len: data.len() as u64,
            });
            core::ptr::copy_nonoverlapping(
                data.as_ptr(),
                (raw as *mut u8).add(HEADER),
                data.len(),
            );
        }
        Self { _buf: buf, raw }
    }

    /// A system-owned wallet with no data.
    pub fn wallet(address: Address, lamports: u64) -> Self {
        Self::new(address, SYSTEM_PROGRAM_ID, lamports, &[])
    }

    /// An executable program account.
    pub fn program(address: Address) -> Self {
        Self::new(address, Address::new_from_array([2; 32]), 1, &[]).executable()
    }

    pub fn system_program() -> Self {
        Self::program(SYSTEM_PROGRAM_ID)
    }

    /// A Clock sysvar reading `now`.
    pub fn clock(now: i64) -> Self {
        Self::clock_at(SYSVAR_CLOCK, now)
    }

    /// Clock-shaped data at an arbitrary address.
    pub fn clock_at(address: Address, now: i64) -> Self {
        let mut data = [0u8; 40];
        data[32..40].copy_from_slice(&now.to_le_bytes());
        Self::new(address, Address::new_from_array([6; 32]), 1, &data)
    }

    fn header(&mut self) -> &mut RuntimeAccount {
        // SAFETY: `raw` points at the initialized header inside `_buf`.
        unsafe { &mut *self.raw }
    }

    pub fn signer(mut self) -> Self {
        self.header().is_signer = 1;
        self
    }

    pub fn writable(mut self) -> Self {
        self.header().is_writable = 1;
        self
    }

    pub fn executable(mut self) -> Self {
        self.header().executable = 1;
        self
    }

    pub fn set_clock(&mut self, now: i64) {
        self.data_mut()[32..40].copy_from_slice(&now.to_le_bytes());
    }

    pub fn view(&self) -> AccountView {
        // SAFETY: the header and data region stay valid for as long as
        // `self` lives; views never outlive a single `process` call.
        unsafe { AccountView::new_unchecked(self.raw) }
    }

    pub fn address(&self) -> Address {
        *self.view().address()
    }

    pub fn lamports(&self) -> u64 {
        self.view().lamports()
    }

    pub fn set_lamports(&mut self, lamports: u64) {
        self.header().lamports = lamports;
    }

    pub fn data(&self) -> &[u8] {
        let len = self.view().data_len();
        // SAFETY: `len` bytes of data follow the header.
        unsafe { core::slice::from_raw_parts((self.raw as *const u8).add(HEADER), len) }
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let len = self.view().data_len();
        // SAFETY: `len` bytes of data follow the header.
        unsafe {
            core::slice::from_raw_parts_mut((self.raw as *mut u8).add(HEADER), len)
        }
    }
}

pub fn address(byte: u8) -> Address {
    Address::new_from_array([byte; 32])
}

/// Views over `accounts`, in order, ready for `process`.
pub fn views(accounts: &[&TestAccount]) -> Vec<AccountView> {
    accounts.iter().map(|a| a.view()).collect()
}

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now(&self) -> Result<i64, ProgramError> {
        Ok(self.0)
    }
}

/// The ledger's authority PDA.
pub fn authority() -> Address {
    pda::ledger_authority(&LEDGER, &PROGRAM_ID).0
}

/// A ledger opened at `now` with default windows, funded to its rent floor.
pub fn ledger_account(now: i64) -> TestAccount {
    let mut data = vec![0u8; LEDGER_LEN];
    let (_, bump) = pda::ledger_authority(&LEDGER, &PROGRAM_ID);
    Ledger::open(
        &mut data[..],
        &BENEFICIARY_ID,
        &BENEFICIARY_STATE,
        &LedgerConfig::default(),
        bump,
        &FixedClock(now),
    )
    .unwrap();
    TestAccount::new(LEDGER, PROGRAM_ID, rent_exempt_min(LEDGER_LEN), &data).writable()
}

/// A beneficiary state bound to `authority`, owned by the beneficiary program.
pub fn beneficiary_state_for(authority: &Address) -> TestAccount {
    let mut data = [0u8; BENEFICIARY_LEN];
    init_state(&mut data, authority).unwrap();
    TestAccount::new(
        BENEFICIARY_STATE,
        BENEFICIARY_ID,
        rent_exempt_min(BENEFICIARY_LEN),
        &data,
    )
    .writable()
}

/// A beneficiary state bound to this ledger's authority.
pub fn beneficiary_state() -> TestAccount {
    beneficiary_state_for(&authority())
}

/// Address of `participant`'s stake record in the test ledger.
pub fn stake_record_address(participant: &Address) -> Address {
    pda::stake_record(&LEDGER, participant, &PROGRAM_ID).0
}

/// An existing stake record for `participant` holding `balance`.
pub fn stake_record_account(participant: &Address, balance: u64) -> TestAccount {
    let (address, bump) = pda::stake_record(&LEDGER, participant, &PROGRAM_ID);
    let mut data = vec![0u8; STAKE_RECORD_LEN];
    StakeRecord::initialize(&mut data[..], &LEDGER, participant, bump).unwrap();
    data[RECORD_BALANCE_OFFSET..RECORD_BALANCE_OFFSET + 8].copy_from_slice(&balance.to_le_bytes());
    TestAccount::new(address, PROGRAM_ID, rent_exempt_min(STAKE_RECORD_LEN), &data).writable()
}

/// A not-yet-created stake record address.
pub fn empty_stake_record(participant: &Address) -> TestAccount {
    TestAccount::wallet(stake_record_address(participant), 0).writable()
}
