use std::fmt;
use std::ops::{Index, IndexMut};

use crate::instruction::Reg;

/// Complete register state of the machine: sixteen 8-bit registers and the
/// program counter.
///
/// The register file is a plain value. Every instruction takes one and
/// returns the next one, so a `RegFile` seen by the caller never changes
/// underneath it.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct RegFile {
    gpr: [u8; 16],
    pc: u16,
}

impl RegFile {
    pub fn new() -> RegFile {
        RegFile {
            gpr: [0; 16],
            pc: 0,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn with_pc(self, pc: u16) -> RegFile {
        RegFile { pc, ..self }
    }

    /// Moves the program counter forward by `bytes`.
    pub fn advance(self, bytes: u16) -> RegFile {
        self.with_pc(self.pc.wrapping_add(bytes))
    }

    pub fn read_at_index(&self, index: usize) -> u8 {
        self.gpr[index]
    }

    pub fn write_at_index(&mut self, index: usize, value: u8) {
        self.gpr[index] = value;
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.gpr
    }

    /// Same layout as the hex dump, with every value as zero-padded binary,
    /// most significant bit first.
    pub fn bin(&self) -> BinDump {
        BinDump(self)
    }
}

impl Index<Reg> for RegFile {
    type Output = u8;

    fn index(&self, index: Reg) -> &u8 {
        &self.gpr[index.index()]
    }
}

impl IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut u8 {
        &mut self.gpr[index.index()]
    }
}

impl fmt::Debug for RegFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dbg = f.debug_struct("RegFile");
        dbg.field("pc", &format!("{:04x}", self.pc));
        for i in 0..16 {
            let reg_name = format!("V{:0X}", i);
            let reg_value = format!("{:02x}", self.read_at_index(i));
            dbg.field(&reg_name, &reg_value);
        }
        dbg.finish()
    }
}

impl fmt::Display for RegFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "\tPC: {:04X}", self.pc)?;
        for (i, value) in self.gpr.iter().enumerate() {
            writeln!(f, "\tV[{:X}]: {:02X}", i, value)?;
        }
        write!(f, "}}")
    }
}

pub struct BinDump<'a>(&'a RegFile);

impl<'a> fmt::Display for BinDump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "\tPC: {:016b}", self.0.pc)?;
        for (i, value) in self.0.gpr.iter().enumerate() {
            writeln!(f, "\tV[{:X}]: {:08b}", i, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let regs = RegFile::new();
        assert_eq!(regs.pc(), 0);
        assert_eq!(regs.registers(), &[0; 16]);
    }

    #[test]
    fn index_by_reg() {
        let mut regs = RegFile::new();
        regs[Reg::Va] = 0x3c;
        assert_eq!(regs.read_at_index(0xa), 0x3c);
        assert_eq!(regs[Reg::Va], 0x3c);
    }

    #[test]
    fn advance_wraps() {
        let regs = RegFile::new().with_pc(0xfffe).advance(4);
        assert_eq!(regs.pc(), 0x0002);
    }

    #[test]
    fn hex_dump() {
        let mut regs = RegFile::new().with_pc(0x0a);
        regs[Reg::Vf] = 0x01;
        let dump = regs.to_string();
        assert!(dump.contains("PC: 000A"));
        assert!(dump.contains("V[F]: 01"));
    }

    #[test]
    fn bin_dump() {
        let mut regs = RegFile::new().with_pc(0x02);
        regs[Reg::V3] = 0x81;
        let dump = regs.bin().to_string();
        assert!(dump.contains("PC: 0000000000000010"));
        assert!(dump.contains("V[3]: 10000001"));
    }

    #[test]
    fn bin_dump_is_msb_first() {
        let mut regs = RegFile::new().with_pc(0x0001);
        regs[Reg::Va] = 0x01;
        regs[Reg::Vb] = 0x80;
        let dump = regs.bin().to_string();
        assert!(dump.contains("PC: 0000000000000001"));
        assert!(dump.contains("V[A]: 00000001"));
        assert!(dump.contains("V[B]: 10000000"));
    }
}
