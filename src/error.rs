use std::fmt;

/// Errors the core can report. Reserved for programming bugs, not runtime
/// input: unused opcodes are silent no-ops and never reach here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// The opcode dispatch reached a state no table entry should produce.
    UndecodedState { opcode: u8, pc: u16 },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::UndecodedState { opcode, pc } => write!(
                f,
                "undecoded dispatch state at PC={:#06X} (opcode {:#04X})",
                pc, opcode
            ),
        }
    }
}

impl std::error::Error for CoreError {}
