use pinocchio::error::ProgramError;

/// Checked u64 addition: returns `ArithmeticOverflow` on overflow.
#[inline(always)]
pub fn checked_add(a: u64, b: u64) -> Result<u64, ProgramError> {
    a.checked_add(b).ok_or(ProgramError::ArithmeticOverflow)
}

/// Checked u64 subtraction: returns `ArithmeticOverflow` on underflow.
#[inline(always)]
pub fn checked_sub(a: u64, b: u64) -> Result<u64, ProgramError> {
    a.checked_sub(b).ok_or(ProgramError::ArithmeticOverflow)
}

/// `now + window` for unix timestamps.
#[inline(always)]
pub fn deadline_after(now: i64, window: i64) -> Result<i64, ProgramError> {
    now.checked_add(window).ok_or(ProgramError::ArithmeticOverflow)
}

/// Approximate minimum lamports for rent exemption at the current mainnet rate.
///
/// Formula: `(128 + data_len) * 6960`. The ledger keeps this floor out of
/// the pool so the account survives a full sweep.
#[inline(always)]
pub fn rent_exempt_min(data_len: usize) -> u64 {
    (128u64 + data_len as u64).saturating_mul(6960)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_after_rejects_overflow() {
        assert_eq!(deadline_after(100, 120), Ok(220));
        assert_eq!(
            deadline_after(i64::MAX - 1, 2),
            Err(ProgramError::ArithmeticOverflow)
        );
    }

    #[test]
    fn rent_floor_grows_with_data() {
        assert_eq!(rent_exempt_min(0), 128 * 6960);
        assert!(rent_exempt_min(112) < rent_exempt_min(152));
    }
}
