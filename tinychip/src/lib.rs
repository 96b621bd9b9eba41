// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

extern crate byteorder;
#[macro_use]
extern crate enum_primitive;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate rand;

pub mod decode;
pub mod exec;
pub mod instruction;
pub mod program;
pub mod random;
pub mod regfile;
pub mod vm;

pub use self::decode::{decode, encode};
pub use self::instruction::{Args, InstructionWord, Operation, Reg};
pub use self::program::{Overflow, Program, PROGRAM_SIZE};
pub use self::random::{RandomSource, Sequence};
pub use self::regfile::RegFile;
pub use self::vm::{HaltReason, Status, Trace, Vm};

error_chain! {
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        ProgramTooLarge(len: usize, limit: usize) {
            description("program does not fit into the program image")
            display("program of at least {} bytes does not fit into the {} byte image", len, limit)
        }
        PcOutOfBounds(pc: u16, limit: usize) {
            description("program counter outside the program image")
            display("program counter {:#06x} is outside the {} byte program image", pc, limit)
        }
        MisalignedPc(pc: u16) {
            description("program counter is not instruction aligned")
            display("program counter {:#06x} is not instruction aligned", pc)
        }
        StepLimitExceeded(limit: u64) {
            description("step limit exceeded")
            display("program did not halt within {} steps", limit)
        }
    }
}
