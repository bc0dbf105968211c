/// Number of operand bytes that follow an opcode.
///
/// Encoded in the top two bits of every opcode byte, so the execution loop can size an
/// instruction without knowing which operation it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Zero,
    One,
    Two,
}

impl Arity {
    /// Decodes the operand count from an opcode byte. The unused pattern `0b11` reads as zero.
    pub const fn of(byte: u8) -> Self {
        match byte >> 6 {
            1 => Arity::One,
            2 => Arity::Two,
            _ => Arity::Zero,
        }
    }

    pub const fn operands(self) -> usize {
        match self {
            Arity::Zero => 0,
            Arity::One => 1,
            Arity::Two => 2,
        }
    }

    /// Total instruction length in bytes, opcode included.
    pub const fn width(self) -> usize {
        1 + self.operands()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // --- Control ---
    Hlt = 0b0000_0001,
    Ret = 0b0001_0001,
    Call = 0b0101_0000,
    Jmp = 0b0101_0100,

    // --- Data Movement ---
    Ldi = 0b1000_0010,
    Prn = 0b0100_0111,

    // --- Stack ---
    Push = 0b0100_0101,
    Pop = 0b0100_0110,

    // --- ALU ---
    Add = 0b1010_0000,
    Sub = 0b1010_0001,
    Mul = 0b1010_0010,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::Hlt,
        Opcode::Ret,
        Opcode::Call,
        Opcode::Jmp,
        Opcode::Ldi,
        Opcode::Prn,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
    ];

    /// Maps a raw byte to a known opcode, or `None` if the byte is unassigned.
    pub fn decode(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.byte() == byte)
    }

    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub const fn arity(self) -> Arity {
        Arity::of(self as u8)
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Ret => "RET",
            Opcode::Call => "CALL",
            Opcode::Jmp => "JMP",
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
        }
    }
}
