use pinocchio::error::ProgramError;

/// Errors surfaced by the staker program.
///
/// Each variant maps to `ProgramError::Custom(code)`, starting at 6000.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum StakerError {
    /// `withdraw` before the withdrawal deadline.
    WithdrawalTooEarly = 6000,
    /// `withdraw` at or after the claim deadline.
    ClaimWindowPassed = 6001,
    /// `withdraw` by a participant with no tracked balance.
    NoBalance = 6002,
    /// `execute` before the claim deadline.
    ClaimTooEarly = 6003,
    /// `stake` with a zero amount.
    InvalidAmount = 6004,
    /// The pool has already been sent to the beneficiary.
    AlreadyExecuted = 6005,
    /// The ledger could not cover an outgoing transfer.
    TransferFailed = 6006,
    /// Deadline windows rejected at initialization.
    InvalidConfig = 6007,
    /// Beneficiary accounts differ from the ones recorded at initialization,
    /// or the beneficiary state does not name the ledger authority.
    BeneficiaryMismatch = 6008,
    /// The beneficiary has already been completed.
    BeneficiaryCompleted = 6009,
}

impl StakerError {
    const ALL: [StakerError; 10] = [
        StakerError::WithdrawalTooEarly,
        StakerError::ClaimWindowPassed,
        StakerError::NoBalance,
        StakerError::ClaimTooEarly,
        StakerError::InvalidAmount,
        StakerError::AlreadyExecuted,
        StakerError::TransferFailed,
        StakerError::InvalidConfig,
        StakerError::BeneficiaryMismatch,
        StakerError::BeneficiaryCompleted,
    ];

    #[inline(always)]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Human-readable reason, logged when an instruction fails.
    pub const fn reason(self) -> &'static str {
        match self {
            StakerError::WithdrawalTooEarly => "Withdrawal period is not reached yet",
            StakerError::ClaimWindowPassed => "Claim deadline has been reached",
            StakerError::NoBalance => "You have no balance to withdraw!",
            StakerError::ClaimTooEarly => "Claim deadline is not reached yet",
            StakerError::InvalidAmount => "Stake amount must be greater than zero",
            StakerError::AlreadyExecuted => "Pool has already been sent to the beneficiary",
            StakerError::TransferFailed => "Ledger cannot cover the transfer",
            StakerError::InvalidConfig => "Invalid ledger configuration",
            StakerError::BeneficiaryMismatch => "Beneficiary does not match the ledger",
            StakerError::BeneficiaryCompleted => "Beneficiary is already completed",
        }
    }

    /// Recover the variant behind a custom error code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }

    /// Recover the variant behind a `ProgramError`, if it is one of ours.
    pub fn from_program_error(err: &ProgramError) -> Option<Self> {
        match err {
            ProgramError::Custom(code) => Self::from_code(*code),
            _ => None,
        }
    }
}

impl From<StakerError> for ProgramError {
    #[inline(always)]
    fn from(e: StakerError) -> Self {
        ProgramError::Custom(e.code())
    }
}

/// Log the reason behind a failed instruction.
#[inline(always)]
pub fn log_failure(err: &ProgramError) {
    match StakerError::from_program_error(err) {
        Some(e) => crate::trace!("Error: {}", e.reason()),
        None => crate::trace!("Error: program error"),
    }
}
