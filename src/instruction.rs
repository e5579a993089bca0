//! Instruction data decoding.
//!
//! Byte 0 is the tag; the rest is little-endian arguments.
//!
//! | tag | instruction      | data                                            |
//! |-----|------------------|-------------------------------------------------|
//! | 0   | Initialize       | [`i64 withdrawal_window`, `i64 claim_window`]   |
//! | 1   | Stake            | `u64 amount`                                    |
//! | 2   | Withdraw         | -                                               |
//! | 3   | Execute          | -                                               |
//! | 4   | ResetDeadlines   | -                                               |

use pinocchio::error::ProgramError;

use crate::config::LedgerConfig;

pub const IX_INITIALIZE: u8 = 0;
pub const IX_STAKE: u8 = 1;
pub const IX_WITHDRAW: u8 = 2;
pub const IX_EXECUTE: u8 = 3;
pub const IX_RESET_DEADLINES: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakerInstruction {
    Initialize(LedgerConfig),
    Stake { amount: u64 },
    Withdraw,
    Execute,
    ResetDeadlines,
}

impl StakerInstruction {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, rest) = data
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;
        let mut args = ArgReader::new(rest);

        let ix = match tag {
            IX_INITIALIZE => {
                let mut config = LedgerConfig::default();
                if !args.is_empty() {
                    config.withdrawal_window = args.read_i64()?;
                    config.claim_window = args.read_i64()?;
                }
                StakerInstruction::Initialize(config)
            }
            IX_STAKE => StakerInstruction::Stake {
                amount: args.read_u64()?,
            },
            IX_WITHDRAW => StakerInstruction::Withdraw,
            IX_EXECUTE => StakerInstruction::Execute,
            IX_RESET_DEADLINES => StakerInstruction::ResetDeadlines,
            _ => return Err(ProgramError::InvalidInstructionData),
        };
        args.finish()?;
        Ok(ix)
    }
}

/// Bounds-checked little-endian reader over instruction arguments.
struct ArgReader<'a> {
    data: &'a [u8],
}

impl<'a> ArgReader<'a> {
    #[inline(always)]
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProgramError> {
        if self.data.len() < N {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (head, tail) = self.data.split_at(N);
        let mut out = [0u8; N];
        out.copy_from_slice(head);
        self.data = tail;
        Ok(out)
    }

    fn read_u64(&mut self) -> Result<u64, ProgramError> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_i64(&mut self) -> Result<i64, ProgramError> {
        self.take().map(i64::from_le_bytes)
    }

    /// Trailing bytes mean the caller built the instruction wrong.
    fn finish(&self) -> Result<(), ProgramError> {
        if !self.data.is_empty() {
            return Err(ProgramError::InvalidInstructionData);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_with_default_windows() {
        assert_eq!(
            StakerInstruction::unpack(&[IX_INITIALIZE]),
            Ok(StakerInstruction::Initialize(LedgerConfig::default()))
        );
    }

    #[test]
    fn initialize_with_explicit_windows() {
        let mut data = vec![IX_INITIALIZE];
        data.extend_from_slice(&30i64.to_le_bytes());
        data.extend_from_slice(&60i64.to_le_bytes());
        assert_eq!(
            StakerInstruction::unpack(&data),
            Ok(StakerInstruction::Initialize(LedgerConfig {
                withdrawal_window: 30,
                claim_window: 60,
            }))
        );

        data.truncate(data.len() - 1);
        assert_eq!(
            StakerInstruction::unpack(&data),
            Err(ProgramError::InvalidInstructionData)
        );
    }

    #[test]
    fn stake_and_bare_instructions() {
        let mut data = vec![IX_STAKE];
        data.extend_from_slice(&120_000_000u64.to_le_bytes());
        assert_eq!(
            StakerInstruction::unpack(&data),
            Ok(StakerInstruction::Stake { amount: 120_000_000 })
        );
        assert_eq!(
            StakerInstruction::unpack(&[IX_WITHDRAW]),
            Ok(StakerInstruction::Withdraw)
        );
        assert_eq!(
            StakerInstruction::unpack(&[IX_EXECUTE]),
            Ok(StakerInstruction::Execute)
        );
        assert_eq!(
            StakerInstruction::unpack(&[IX_RESET_DEADLINES]),
            Ok(StakerInstruction::ResetDeadlines)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            StakerInstruction::unpack(&[]),
            Err(ProgramError::InvalidInstructionData)
        );
        assert_eq!(
            StakerInstruction::unpack(&[9]),
            Err(ProgramError::InvalidInstructionData)
        );
        assert_eq!(
            StakerInstruction::unpack(&[IX_WITHDRAW, 0]),
            Err(ProgramError::InvalidInstructionData)
        );
        assert_eq!(
            StakerInstruction::unpack(&[IX_STAKE, 1, 2]),
            Err(ProgramError::InvalidInstructionData)
        );
    }
}
