use crate::vm::memory::{Memory, Registers, REGISTER_COUNT};
use std::fmt;

/// Snapshot of the machine taken just before an instruction executes.
///
/// Renders as `TRACE: PC | b0 b1 b2 | R0 R1 .. R7` in two-digit hex. Bytes at and after the
/// PC that were never written show as `--`, so a trace can always be taken even at the end
/// of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub pc: u8,
    pub bytes: [Option<u8>; 3],
    pub registers: [u8; REGISTER_COUNT],
}

impl TraceLine {
    pub fn capture(pc: u8, memory: &Memory, registers: &Registers) -> Self {
        let at = |offset: usize| memory.peek(pc as usize + offset);
        Self {
            pc,
            bytes: [at(0), at(1), at(2)],
            registers: *registers.as_array(),
        }
    }
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRACE: {:02X} |", self.pc)?;
        for byte in &self.bytes {
            match byte {
                Some(b) => write!(f, " {:02X}", b)?,
                None => write!(f, " --")?,
            }
        }
        write!(f, " |")?;
        for reg in &self.registers {
            write!(f, " {:02X}", reg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::engine::Cpu;

    #[test]
    fn test_trace_format() {
        let mut cpu = Cpu::new(Vec::new());
        cpu.load(&[0b1000_0010, 0, 8, 0b0000_0001]).unwrap();
        assert_eq!(
            cpu.trace().to_string(),
            "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4"
        );
        cpu.step().unwrap();
        assert_eq!(
            cpu.trace().to_string(),
            "TRACE: 03 | 01 -- -- | 08 00 00 00 00 00 00 F4"
        );
    }

    #[test]
    fn test_trace_at_last_address() {
        let memory = Memory::new();
        let line = TraceLine::capture(0xFF, &memory, &Registers::new());
        assert_eq!(line.bytes, [None, None, None]);
    }
}
