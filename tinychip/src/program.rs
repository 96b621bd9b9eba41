use std::fmt;
use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::instruction::InstructionWord;
use crate::{ErrorKind, Result};

/// Capacity of the program image in bytes.
pub const PROGRAM_SIZE: usize = 2048;

/// What to do with a program that does not fit into the image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Overflow {
    /// Keep the first `PROGRAM_SIZE` bytes and drop the rest.
    Truncate,
    /// Refuse to load.
    Reject,
}

impl Default for Overflow {
    fn default() -> Overflow {
        Overflow::Truncate
    }
}

/// Read-only program memory. Bytes past the loaded program stay zero, which
/// decodes as a halt.
#[derive(Clone)]
pub struct Program {
    memory: Box<[u8; PROGRAM_SIZE]>,
    len: usize,
    truncated: usize,
}

impl Program {
    pub fn from_bytes(bytes: &[u8], overflow: Overflow) -> Result<Program> {
        let truncated = bytes.len().saturating_sub(PROGRAM_SIZE);
        if truncated > 0 && overflow == Overflow::Reject {
            bail!(ErrorKind::ProgramTooLarge(bytes.len(), PROGRAM_SIZE));
        }

        let len = bytes.len() - truncated;
        let mut memory = Box::new([0; PROGRAM_SIZE]);
        memory[..len].copy_from_slice(&bytes[..len]);

        if truncated > 0 {
            warn!(
                "program does not fit into the {} byte image, ignoring {} byte(s) past it",
                PROGRAM_SIZE, truncated
            );
        }
        debug!("loaded {} byte program", len);

        Ok(Program {
            memory,
            len,
            truncated,
        })
    }

    /// Loads a program from `reader`, consuming at most one byte more than
    /// the image holds. The extra byte only tells that the program does not
    /// fit, so `truncated()` is 1 for any oversized input read this way.
    pub fn from_reader<R: Read>(reader: &mut R, overflow: Overflow) -> Result<Program> {
        let mut bytes = Vec::with_capacity(PROGRAM_SIZE + 1);
        reader
            .by_ref()
            .take(PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut bytes)?;
        Program::from_bytes(&bytes, overflow)
    }

    /// Number of bytes actually loaded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes dropped because they did not fit.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.memory[..]
    }

    /// Reads the instruction word at `pc`.
    pub fn fetch(&self, pc: u16) -> Result<InstructionWord> {
        let at = pc as usize;
        if at % 2 != 0 {
            bail!(ErrorKind::MisalignedPc(pc));
        }
        if at + 1 >= PROGRAM_SIZE {
            bail!(ErrorKind::PcOutOfBounds(pc, PROGRAM_SIZE));
        }
        Ok(InstructionWord(BigEndian::read_u16(&self.memory[at..at + 2])))
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Program")
            .field("len", &self.len)
            .field("truncated", &self.truncated)
            .finish()
    }
}
