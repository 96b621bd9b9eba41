//! One state transition per operation.
//!
//! Every function takes the current register file by value and returns the
//! next one. Register writes happen in a fixed order which only shows when
//! `x` or `y` is `VF`: additions write `Vx` and then the flag, every other
//! flag-setting operation writes the flag first and computes `Vx` from the
//! updated registers.

use crate::instruction::{Args, Reg};
use crate::regfile::RegFile;

/// Width of one instruction in bytes.
pub const INSTRUCTION_SIZE: u16 = 2;

/// Additions set the carry flag when the operands sum past this value.
pub const ADD_CARRY_THRESHOLD: u32 = 0xF;

/// PC = nnn
pub fn jump(regs: RegFile, args: Args) -> RegFile {
    regs.with_pc(args.addr)
}

/// if Vx == kk then skip the next instruction
pub fn skip_eq_imm(regs: RegFile, args: Args) -> RegFile {
    if regs[args.x] == (args.value & 0xFF) as u8 {
        regs.advance(2 * INSTRUCTION_SIZE)
    } else {
        regs.advance(INSTRUCTION_SIZE)
    }
}

/// Vx = kk
pub fn load_imm(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    next[args.x] = args.value as u8;
    next.advance(INSTRUCTION_SIZE)
}

/// Vx = Vx + kk + VF; VF = carry
pub fn add_imm(regs: RegFile, args: Args) -> RegFile {
    add(regs, args.x, args.value as u8)
}

/// Vx = Vy
pub fn assign(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    next[args.x] = regs[args.y];
    next.advance(INSTRUCTION_SIZE)
}

/// Vx |= Vy
pub fn or(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    next[args.x] |= regs[args.y];
    next.advance(INSTRUCTION_SIZE)
}

/// Vx &= Vy
pub fn and(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    next[args.x] &= regs[args.y];
    next.advance(INSTRUCTION_SIZE)
}

/// Vx ^= Vy
pub fn xor(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    next[args.x] ^= regs[args.y];
    next.advance(INSTRUCTION_SIZE)
}

/// Vx = Vx + Vy + VF; VF = carry
pub fn add_reg(regs: RegFile, args: Args) -> RegFile {
    add(regs, args.x, regs[args.y])
}

/// The incoming VF is added as a carry-in. The outgoing carry compares the
/// sum of the two operands alone against `ADD_CARRY_THRESHOLD`.
fn add(regs: RegFile, vx: Reg, operand: u8) -> RegFile {
    let mut next = regs;
    let x = regs[vx];
    let carry = if x as u32 + operand as u32 > ADD_CARRY_THRESHOLD {
        1
    } else {
        0
    };
    next[vx] = x.wrapping_add(operand).wrapping_add(regs[Reg::Vf]);
    next[Reg::Vf] = carry;
    next.advance(INSTRUCTION_SIZE)
}

/// Vx = Vx - Vy; VF = 0 on borrow, 1 otherwise
pub fn sub(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    let mut x = next[args.x] as u16;
    if next[args.x] < next[args.y] {
        next[Reg::Vf] = 0;
        x += 0x100;
    } else {
        next[Reg::Vf] = 1;
    }
    next[args.x] = x.wrapping_sub(next[args.y] as u16) as u8;
    next.advance(INSTRUCTION_SIZE)
}

/// Vx >>= 1; VF = lsb
pub fn shift_right(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    next[Reg::Vf] = next[args.x] & 0x01;
    next[args.x] >>= 1;
    next.advance(INSTRUCTION_SIZE)
}

/// Vx = Vy - Vx; VF = 1 on borrow, unchanged otherwise
pub fn sub_inv(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    if next[args.y] < next[args.x] {
        next[Reg::Vf] = 1;
    }
    let y = next[args.y] as u16;
    next[args.x] = y.wrapping_sub(next[args.x] as u16) as u8;
    next.advance(INSTRUCTION_SIZE)
}

/// Vx <<= 1; VF = msb, left in place as 0x00 or 0x80
pub fn shift_left(regs: RegFile, args: Args) -> RegFile {
    let mut next = regs;
    next[Reg::Vf] = next[args.x] & 0x80;
    next[args.x] <<= 1;
    next.advance(INSTRUCTION_SIZE)
}

/// Vx = random_byte & kk
pub fn random_and(regs: RegFile, args: Args, random_byte: u8) -> RegFile {
    let mut next = regs;
    next[args.x] = random_byte & args.value as u8;
    next.advance(INSTRUCTION_SIZE)
}
