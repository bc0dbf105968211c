//! The LS-8 virtual machine.
//!
//! - [`op`]: opcode bytes and the operand-count encoding in their top two bits
//! - [`memory`]: 256 bytes of strict memory and the eight-register file
//! - [`engine`]: dispatch table, opcode handlers and the fetch/decode/execute loop
//! - [`trace`]: per-instruction state snapshots for debugging
//! - [`disasm`]: program image to text

pub mod disasm;
pub mod engine;
pub mod memory;
pub mod op;
pub mod trace;

pub use engine::{Cpu, Flow, RunSummary, Status, VmError};
