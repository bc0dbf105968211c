use crate::vm::op::{Arity, Opcode};

/// Renders a program image as one line per instruction, e.g. `03: ADD R0,R1`.
///
/// Unassigned bytes and instructions cut short by the end of the image are printed as
/// `.byte 0xNN` and skipped one byte at a time, so data following HLT still shows up.
pub fn disassemble(program: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut offset = 0;

    while offset < program.len() {
        let byte = program[offset];
        let operands = program.get(offset + 1..offset + Arity::of(byte).width());

        let (text, size) = match (Opcode::decode(byte), operands) {
            (Some(op), Some(operands)) => (format_instruction(op, operands), op.arity().width()),
            _ => (format!(".byte 0x{:02X}", byte), 1),
        };

        lines.push(format!("{:02X}: {}", offset, text));
        offset += size;
    }

    lines
}

fn format_instruction(op: Opcode, operands: &[u8]) -> String {
    match (op, operands) {
        // The second LDI operand is an immediate, not a register.
        (Opcode::Ldi, [reg, value]) => format!("LDI R{},{}", reg, value),
        (op, [a, b]) => format!("{} R{},R{}", op.mnemonic(), a, b),
        (op, [a]) => format!("{} R{}", op.mnemonic(), a),
        (op, _) => op.mnemonic().to_string(),
    }
}
