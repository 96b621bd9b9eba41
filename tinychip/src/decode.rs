//! Mapping between instruction words and `(Operation, Args)` pairs.
//!
//! Decoding never fails. Words the machine has no operation for decode to
//! [`Operation::Unimplemented`], which the VM treats exactly like `Halt`.

use crate::instruction::{Args, InstructionWord, Operation, Reg};

/// `_xkk`: register index and 8-bit immediate.
pub fn extract_x_and_value(word: InstructionWord) -> Args {
    Args {
        x: Reg::from_nibble(word.x()),
        value: word.kk() as u16,
        ..Args::default()
    }
}

/// `_nnn`: 12-bit address.
pub fn extract_address(word: InstructionWord) -> Args {
    Args {
        addr: word.nnn(),
        ..Args::default()
    }
}

/// `_xy_`: two register indices.
pub fn extract_x_and_y(word: InstructionWord) -> Args {
    Args {
        x: Reg::from_nibble(word.x()),
        y: Reg::from_nibble(word.y()),
        ..Args::default()
    }
}

pub fn decode(word: InstructionWord) -> (Operation, Args) {
    use crate::instruction::Operation::*;

    match word.op() {
        0x0 => (Halt, Args::default()),
        0x1 => (Jump, extract_address(word)),
        0x3 => (SkipEqImm, extract_x_and_value(word)),
        0x6 => (LoadImm, extract_x_and_value(word)),
        0x7 => (AddImm, extract_x_and_value(word)),
        0x8 => {
            let args = extract_x_and_y(word);
            let op = match word.n() {
                0x0 => Assign,
                0x1 => Or,
                0x2 => And,
                0x3 => Xor,
                0x4 => AddReg,
                0x5 => Sub,
                0x6 => ShiftRight,
                0x7 => SubInv,
                0xE => ShiftLeft,
                _ => Unimplemented,
            };
            (op, args)
        }
        0xC => (RandomAnd, extract_x_and_value(word)),
        _ => (Unimplemented, Args::default()),
    }
}

/// Inverse of [`decode`]. `Unimplemented` stands for many words and has no
/// encoding.
pub fn encode(op: Operation, args: Args) -> Option<InstructionWord> {
    use crate::instruction::Operation::*;

    let x = (args.x.index() as u16) << 8;
    let y = (args.y.index() as u16) << 4;
    let kk = args.value & 0x00FF;

    let raw = match op {
        Halt => 0x0000,
        Jump => 0x1000 | (args.addr & 0x0FFF),
        SkipEqImm => 0x3000 | x | kk,
        LoadImm => 0x6000 | x | kk,
        AddImm => 0x7000 | x | kk,
        Assign => 0x8000 | x | y,
        Or => 0x8001 | x | y,
        And => 0x8002 | x | y,
        Xor => 0x8003 | x | y,
        AddReg => 0x8004 | x | y,
        Sub => 0x8005 | x | y,
        ShiftRight => 0x8006 | x | y,
        SubInv => 0x8007 | x | y,
        ShiftLeft => 0x800E | x | y,
        RandomAnd => 0xC000 | x | kk,
        Unimplemented => return None,
    };

    Some(InstructionWord(raw))
}
