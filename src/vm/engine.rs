use crate::config::VmConfig;
use crate::vm::memory::{Memory, Registers, MEMORY_SIZE};
use crate::vm::op::{Arity, Opcode};
use crate::vm::trace::TraceLine;
use log::{debug, warn};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VmError {
    #[error("Unsupported operation 0x{opcode:02X} at address 0x{address:02X}")]
    UnsupportedOperation { opcode: u8, address: u8 },
    #[error("Read of uninitialized memory at address {address:#04X}")]
    UninitializedMemory { address: usize },
    #[error("Memory address {address:#X} is out of bounds")]
    AddressOutOfBounds { address: usize },
    #[error("Register index {index} is out of range (R0-R7)")]
    InvalidRegister { index: u8 },
    #[error("Program of {len} bytes does not fit in {capacity} bytes of memory")]
    ProgramTooLarge { len: usize, capacity: usize },
    #[error("Step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: u64 },
    #[error("Failed to write program output: {0}")]
    Output(#[from] io::Error),
}

/// What the loop does with the PC after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Move past the instruction just executed.
    Advance,
    /// The handler transferred control; the PC becomes this address as-is.
    Jump(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed, not counting the final HLT.
    pub steps: u64,
    /// Address of the HLT that stopped the run.
    pub halted_at: u8,
}

pub type Outcome = Result<Flow, VmError>;

/// A dispatch table entry. The variant matches the operand count encoded in the opcode.
pub enum Handler<W: Write> {
    Nullary(fn(&mut Cpu<W>) -> Outcome),
    Unary(fn(&mut Cpu<W>, u8) -> Outcome),
    Binary(fn(&mut Cpu<W>, u8, u8) -> Outcome),
}

impl<W: Write> Handler<W> {
    pub fn arity(&self) -> Arity {
        match self {
            Handler::Nullary(_) => Arity::Zero,
            Handler::Unary(_) => Arity::One,
            Handler::Binary(_) => Arity::Two,
        }
    }
}

/// The LS-8 machine: memory, registers, program counter and the output sink PRN writes to.
pub struct Cpu<W: Write> {
    registers: Registers,
    memory: Memory,
    pc: u8,
    status: Status,
    steps: u64,
    max_steps: Option<u64>,
    trace: bool,
    output: W,
}

impl<W: Write> Cpu<W> {
    pub fn new(output: W) -> Self {
        Self::with_config(&VmConfig::default(), output)
    }

    pub fn with_config(config: &VmConfig, output: W) -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(),
            pc: 0,
            status: Status::Running,
            steps: 0,
            max_steps: config.max_steps,
            trace: config.trace,
            output,
        }
    }

    /// Writes `program` into memory starting at address 0.
    pub fn load(&mut self, program: &[u8]) -> Result<(), VmError> {
        if program.len() > MEMORY_SIZE {
            return Err(VmError::ProgramTooLarge {
                len: program.len(),
                capacity: MEMORY_SIZE,
            });
        }
        if program.is_empty() {
            warn!("Loading an empty program; the first fetch will fault.");
        }
        for (address, byte) in (0..=u8::MAX).zip(program) {
            self.memory.write(address, *byte);
        }
        debug!("Loaded {} bytes into memory", program.len());
        Ok(())
    }

    /// Runs until HLT. Any fault aborts the run; output already written stays written.
    pub fn run(&mut self) -> Result<RunSummary, VmError> {
        while self.step()? == Status::Running {}
        self.output.flush()?;
        debug!(
            "Halted at {:#04X} after {} instructions",
            self.pc, self.steps
        );
        Ok(RunSummary {
            steps: self.steps,
            halted_at: self.pc,
        })
    }

    /// Executes a single instruction and reports whether the machine is still running.
    pub fn step(&mut self) -> Result<Status, VmError> {
        if self.status == Status::Halted {
            return Ok(Status::Halted);
        }

        let pc = self.pc;
        let byte = self.memory.read(pc as usize)?;
        if byte == Opcode::Hlt.byte() {
            self.status = Status::Halted;
            return Ok(Status::Halted);
        }

        if let Some(limit) = self.max_steps {
            if self.steps >= limit {
                return Err(VmError::StepLimitExceeded { limit });
            }
        }

        let handler = Opcode::decode(byte)
            .and_then(Self::dispatch)
            .ok_or(VmError::UnsupportedOperation {
                opcode: byte,
                address: pc,
            })?;

        let arity = Arity::of(byte);
        let operand_a = match arity {
            Arity::Zero => 0,
            _ => self.memory.read(pc as usize + 1)?,
        };
        let operand_b = match arity {
            Arity::Two => self.memory.read(pc as usize + 2)?,
            _ => 0,
        };

        if self.trace {
            debug!("{}", self.trace());
        }

        let flow = match handler {
            Handler::Nullary(f) => f(self)?,
            Handler::Unary(f) => f(self, operand_a)?,
            Handler::Binary(f) => f(self, operand_a, operand_b)?,
        };

        self.pc = match flow {
            Flow::Advance => Self::offset(pc, arity.width())?,
            Flow::Jump(target) => target,
        };
        self.steps += 1;
        Ok(Status::Running)
    }

    /// Opcode to handler. HLT has no entry; the loop stops before dispatching it.
    pub fn dispatch(opcode: Opcode) -> Option<Handler<W>> {
        use Handler::*;
        Some(match opcode {
            Opcode::Ldi => Binary(Self::ldi),
            Opcode::Prn => Unary(Self::prn),
            Opcode::Add => Binary(Self::add),
            Opcode::Sub => Binary(Self::sub),
            Opcode::Mul => Binary(Self::mul),
            Opcode::Push => Unary(Self::push),
            Opcode::Pop => Unary(Self::pop),
            Opcode::Jmp => Unary(Self::jmp),
            Opcode::Call => Unary(Self::call),
            Opcode::Ret => Nullary(Self::ret),
            Opcode::Hlt => return None,
        })
    }

    pub fn trace(&self) -> TraceLine {
        TraceLine::capture(self.pc, &self.memory, &self.registers)
    }

    pub fn pc(&self) -> u8 {
        self.pc
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn offset(pc: u8, distance: usize) -> Result<u8, VmError> {
        let address = pc as usize + distance;
        u8::try_from(address).map_err(|_| VmError::AddressOutOfBounds { address })
    }

    // --- Data Movement ---

    fn ldi(&mut self, reg: u8, value: u8) -> Outcome {
        self.registers.set(reg, value)?;
        Ok(Flow::Advance)
    }

    fn prn(&mut self, reg: u8) -> Outcome {
        let value = self.registers.get(reg)?;
        writeln!(self.output, "{}", value)?;
        Ok(Flow::Advance)
    }

    // --- ALU (8-bit wrapping) ---

    #[inline]
    fn apply_binary_op<F>(&mut self, reg_a: u8, reg_b: u8, op: F) -> Outcome
    where
        F: Fn(u8, u8) -> u8,
    {
        let a = self.registers.get(reg_a)?;
        let b = self.registers.get(reg_b)?;
        self.registers.set(reg_a, op(a, b))?;
        Ok(Flow::Advance)
    }

    fn add(&mut self, reg_a: u8, reg_b: u8) -> Outcome {
        self.apply_binary_op(reg_a, reg_b, u8::wrapping_add)
    }

    fn sub(&mut self, reg_a: u8, reg_b: u8) -> Outcome {
        self.apply_binary_op(reg_a, reg_b, u8::wrapping_sub)
    }

    fn mul(&mut self, reg_a: u8, reg_b: u8) -> Outcome {
        self.apply_binary_op(reg_a, reg_b, u8::wrapping_mul)
    }

    // --- Stack ---

    fn push_value(&mut self, value: u8) {
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        self.memory.write(sp, value);
    }

    fn pop_value(&mut self) -> Result<u8, VmError> {
        let sp = self.registers.sp();
        let value = self.memory.read(sp as usize)?;
        self.registers.set_sp(sp.wrapping_add(1));
        Ok(value)
    }

    // PUSH, POP and CALL touch the stack pointer and their register operand in a fixed
    // order, which is observable when the operand is R7 itself. Operands are validated
    // before the stack pointer moves.

    fn push(&mut self, reg: u8) -> Outcome {
        self.registers.get(reg)?;
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        let value = self.registers.get(reg)?;
        self.memory.write(sp, value);
        Ok(Flow::Advance)
    }

    fn pop(&mut self, reg: u8) -> Outcome {
        self.registers.get(reg)?;
        let value = self.memory.read(self.registers.sp() as usize)?;
        self.registers.set(reg, value)?;
        self.registers.set_sp(self.registers.sp().wrapping_add(1));
        Ok(Flow::Advance)
    }

    // --- Control Flow ---

    fn jmp(&mut self, reg: u8) -> Outcome {
        Ok(Flow::Jump(self.registers.get(reg)?))
    }

    fn call(&mut self, reg: u8) -> Outcome {
        self.registers.get(reg)?;
        let return_address = Self::offset(self.pc, Opcode::Call.arity().width())?;
        self.push_value(return_address);
        Ok(Flow::Jump(self.registers.get(reg)?))
    }

    fn ret(&mut self) -> Outcome {
        Ok(Flow::Jump(self.pop_value()?))
    }
}
