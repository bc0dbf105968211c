use crate::vm::engine::VmError;

pub const MEMORY_SIZE: usize = 256;
pub const REGISTER_COUNT: usize = 8;
/// Register reserved for the stack pointer.
pub const SP: u8 = 7;
/// Initial stack pointer. The stack grows downward from here.
pub const STACK_BASE: u8 = 0xF4;

/// Flat byte-addressed memory.
///
/// Every cell remembers whether it has ever been written. Reading a cell that was never
/// written is a fault rather than a silent zero, which surfaces a PC running off the end of
/// the program or a POP past the bottom of the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: [Option<u8>; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            cells: [None; MEMORY_SIZE],
        }
    }

    /// Takes `usize` so operand fetches past `0xFF` report `AddressOutOfBounds` instead of
    /// wrapping back to address 0.
    pub fn read(&self, address: usize) -> Result<u8, VmError> {
        match self.cells.get(address) {
            Some(Some(value)) => Ok(*value),
            Some(None) => Err(VmError::UninitializedMemory { address }),
            None => Err(VmError::AddressOutOfBounds { address }),
        }
    }

    /// Like [`Memory::read`] but without the fault, for diagnostics.
    pub fn peek(&self, address: usize) -> Option<u8> {
        self.cells.get(address).copied().flatten()
    }

    pub fn write(&mut self, address: u8, value: u8) {
        self.cells[address as usize] = Some(value);
    }

    pub fn is_written(&self, address: u8) -> bool {
        self.cells[address as usize].is_some()
    }
}

/// The eight general-purpose registers. R7 doubles as the stack pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    regs: [u8; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        let mut regs = [0; REGISTER_COUNT];
        regs[SP as usize] = STACK_BASE;
        Self { regs }
    }

    pub fn get(&self, index: u8) -> Result<u8, VmError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(VmError::InvalidRegister { index })
    }

    pub fn set(&mut self, index: u8, value: u8) -> Result<(), VmError> {
        let slot = self
            .regs
            .get_mut(index as usize)
            .ok_or(VmError::InvalidRegister { index })?;
        *slot = value;
        Ok(())
    }

    #[inline]
    pub fn sp(&self) -> u8 {
        self.regs[SP as usize]
    }

    #[inline]
    pub fn set_sp(&mut self, value: u8) {
        self.regs[SP as usize] = value;
    }

    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.regs
    }
}
