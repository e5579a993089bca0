use pinocchio::{error::ProgramError, Address};

/// Beneficiary state discriminator.
pub const BENEFICIARY_DISC: u8 = 1;

/// Beneficiary state version.
pub const BENEFICIARY_VERSION: u8 = 2;

/// Total size of the beneficiary state account.
///
/// Layout:
///   [0]       u8       discriminator   (= 1)
///   [1]       u8       version         (= 2)
///   [2]       u8       flags           (bit 0 = completed)
///   [3]       u8       reserved        (0)
///   [4..8]    u32      data_len        (40)
///   --- payload ---
///   [8..40]   Address  authority       (only signer allowed to `Complete`)
///   [40..48]  u64      total_received
///
/// Total: 8 (header) + 40 = 48 bytes
pub const BENEFICIARY_LEN: usize = 48;

/// Set by `Complete`.
pub const FLAG_COMPLETED: u8 = 0;

pub const AUTHORITY_OFFSET: usize = 8;
pub const TOTAL_RECEIVED_OFFSET: usize = 40;

/// Write a fresh, not-yet-completed state bound to `authority`.
pub fn init_state(data: &mut [u8], authority: &Address) -> Result<(), ProgramError> {
    if data.len() < BENEFICIARY_LEN {
        return Err(ProgramError::AccountDataTooSmall);
    }
    data.fill(0);
    data[0] = BENEFICIARY_DISC;
    data[1] = BENEFICIARY_VERSION;
    data[4..8].copy_from_slice(&((BENEFICIARY_LEN - 8) as u32).to_le_bytes());
    data[AUTHORITY_OFFSET..AUTHORITY_OFFSET + 32].copy_from_slice(authority.as_array());
    Ok(())
}

pub fn check_state(data: &[u8]) -> Result<(), ProgramError> {
    if data.len() < BENEFICIARY_LEN {
        return Err(ProgramError::AccountDataTooSmall);
    }
    if data[0] != BENEFICIARY_DISC || data[1] < BENEFICIARY_VERSION {
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

/// The read-only `completed` query.
pub fn is_completed(data: &[u8]) -> Result<bool, ProgramError> {
    check_state(data)?;
    Ok((data[2] >> FLAG_COMPLETED) & 1 == 1)
}

pub fn authority(data: &[u8]) -> Result<Address, ProgramError> {
    check_state(data)?;
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[AUTHORITY_OFFSET..AUTHORITY_OFFSET + 32]);
    Ok(Address::new_from_array(bytes))
}

/// Reject any `signer` other than the stored authority.
pub fn check_authority(data: &[u8], signer: &Address) -> Result<(), ProgramError> {
    if authority(data)? != *signer {
        return Err(ProgramError::IncorrectAuthority);
    }
    Ok(())
}

pub fn total_received(data: &[u8]) -> Result<u64, ProgramError> {
    check_state(data)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[TOTAL_RECEIVED_OFFSET..TOTAL_RECEIVED_OFFSET + 8]);
    Ok(u64::from_le_bytes(bytes))
}

/// Flip `completed` and record `amount`. Fails if already completed.
pub fn complete(data: &mut [u8], amount: u64) -> Result<(), ProgramError> {
    if is_completed(data)? {
        return Err(ProgramError::InvalidAccountData);
    }
    let total = total_received(data)?
        .checked_add(amount)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    data[2] |= 1 << FLAG_COMPLETED;
    data[TOTAL_RECEIVED_OFFSET..TOTAL_RECEIVED_OFFSET + 8].copy_from_slice(&total.to_le_bytes());
    Ok(())
}
