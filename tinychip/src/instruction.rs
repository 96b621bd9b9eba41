use std::fmt;

use enum_primitive::FromPrimitive;

/// Raw two-byte instruction as it appears in the program image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstructionWord(pub u16);

impl InstructionWord {
    pub fn from_bytes(hi: u8, lo: u8) -> InstructionWord {
        InstructionWord((hi as u16) << 8 | lo as u16)
    }

    pub fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn lo(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// `(op, x, y, n)`, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (self.op(), self.x(), self.y(), self.n())
    }

    /// `[o___]`
    pub fn op(self) -> u8 {
        ((self.0 & 0xF000) >> 12) as u8
    }

    /// `[_x__]`
    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    /// `[__y_]`
    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    /// `[___n]`
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// `[__kk]`
    pub fn kk(self) -> u8 {
        self.lo()
    }

    /// `[_nnn]`
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl fmt::Display for InstructionWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

enum_from_primitive! {
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    V0 = 0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    Va,
    Vb,
    Vc,
    Vd,
    Ve,
    Vf,
}
}

impl Reg {
    /// Register named by the low nibble of `nibble`.
    pub fn from_nibble(nibble: u8) -> Reg {
        // Every value in 0..16 names a register.
        Reg::from_u8(nibble & 0x0F).unwrap_or(Reg::V0)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl Default for Reg {
    fn default() -> Reg {
        Reg::V0
    }
}

/// Operation selected by the decoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `0___`
    Halt,
    /// `1nnn`: PC = nnn
    Jump,
    /// `3xkk`: skip next if Vx == kk
    SkipEqImm,
    /// `6xkk`: Vx = kk
    LoadImm,
    /// `7xkk`: Vx = Vx + kk + VF
    AddImm,
    /// `8xy0`: Vx = Vy
    Assign,
    /// `8xy1`: Vx |= Vy
    Or,
    /// `8xy2`: Vx &= Vy
    And,
    /// `8xy3`: Vx ^= Vy
    Xor,
    /// `8xy4`: Vx = Vx + Vy + VF
    AddReg,
    /// `8xy5`: Vx = Vx - Vy
    Sub,
    /// `8x_6`: Vx >>= 1
    ShiftRight,
    /// `8xy7`: Vx = Vy - Vx
    SubInv,
    /// `8x_E`: Vx <<= 1
    ShiftLeft,
    /// `Cxkk`: Vx = random & kk
    RandomAnd,
    /// Any word the decoder has no operation for. Executes like `Halt`.
    Unimplemented,
}

impl Operation {
    pub fn mnemonic(self) -> &'static str {
        use self::Operation::*;

        match self {
            Halt => "HALT",
            Jump => "JP",
            SkipEqImm => "SE",
            LoadImm => "LD",
            AddImm => "ADD",
            Assign => "LDR",
            Or => "OR",
            And => "AND",
            Xor => "XOR",
            AddReg => "ADDR",
            Sub => "SUB",
            ShiftRight => "SHR",
            SubInv => "SUBN",
            ShiftLeft => "SHL",
            RandomAnd => "RND",
            Unimplemented => "???",
        }
    }

    /// Whether executing this operation ends the run.
    pub fn is_terminal(self) -> bool {
        match self {
            Operation::Halt | Operation::Unimplemented => true,
            _ => false,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Operands pulled out of an instruction word. Fields an operation does not
/// use are left at zero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Args {
    pub addr: u16,
    pub x: Reg,
    pub y: Reg,
    pub value: u16,
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{ addr: {:04X}, x: {:X}, y: {:X}, value: {:04X} }}",
            self.addr,
            self.x.index(),
            self.y.index(),
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibbles() {
        let word = InstructionWord(0xABCD);
        assert_eq!(word.nibbles(), (0xA, 0xB, 0xC, 0xD));
        assert_eq!(word.kk(), 0xCD);
        assert_eq!(word.nnn(), 0x0BCD);
    }

    #[test]
    fn from_bytes_is_big_endian() {
        let word = InstructionWord::from_bytes(0x6A, 0x3C);
        assert_eq!(word, InstructionWord(0x6A3C));
        assert_eq!(word.hi(), 0x6A);
        assert_eq!(word.lo(), 0x3C);
    }

    #[test]
    fn display_as_hex() {
        assert_eq!(InstructionWord(0x00e0).to_string(), "00E0");
    }

    #[test]
    fn reg_from_nibble() {
        assert_eq!(Reg::from_nibble(0x0), Reg::V0);
        assert_eq!(Reg::from_nibble(0xA), Reg::Va);
        assert_eq!(Reg::from_nibble(0xF), Reg::Vf);
        assert_eq!(Reg::Vf.index(), 15);
    }

    #[test]
    fn only_halt_and_unimplemented_are_terminal() {
        assert!(Operation::Halt.is_terminal());
        assert!(Operation::Unimplemented.is_terminal());
        assert!(!Operation::Jump.is_terminal());
    }
}
