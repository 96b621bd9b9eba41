use std::fmt;

use crate::decode::decode;
use crate::exec;
use crate::instruction::{Args, InstructionWord, Operation};
use crate::program::Program;
use crate::random::RandomSource;
use crate::regfile::RegFile;
use crate::{ErrorKind, Result};

/// Why execution stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// A `0___` instruction.
    Explicit,
    /// A word with no operation behind it.
    Unimplemented(InstructionWord),
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HaltReason::Explicit => f.write_str("halt instruction"),
            HaltReason::Unimplemented(word) => write!(f, "unimplemented opcode {}", word),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted(HaltReason),
}

/// One fetched and decoded instruction, reported before it executes.
#[derive(Copy, Clone, Debug)]
pub struct Trace {
    pub step: u64,
    pub word: InstructionWord,
    pub op: Operation,
    pub args: Args,
    pub regs: RegFile,
}

pub struct Vm {
    program: Program,
    regs: RegFile,
    steps: u64,
    status: Status,
}

impl Vm {
    pub fn new(program: Program) -> Vm {
        Vm {
            program,
            regs: RegFile::new(),
            steps: 0,
            status: Status::Running,
        }
    }

    pub fn regs(&self) -> RegFile {
        self.regs
    }

    /// Number of instructions executed so far. Halting does not count.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Fetches, decodes and executes a single instruction.
    pub fn step<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<Status> {
        self.step_traced(rng, &mut |_: &Trace| {})
    }

    fn step_traced<R, F>(&mut self, rng: &mut R, observer: &mut F) -> Result<Status>
    where
        R: RandomSource + ?Sized,
        F: FnMut(&Trace),
    {
        if let Status::Halted(_) = self.status {
            return Ok(self.status);
        }

        let pc = self.regs.pc();
        let word = self.program.fetch(pc)?;
        let (op, args) = decode(word);
        trace!("{:04x}: {} {} {}", pc, word, op, args);

        observer(&Trace {
            step: self.steps,
            word,
            op,
            args,
            regs: self.regs,
        });

        self.regs = match op {
            Operation::Halt => return Ok(self.halt(HaltReason::Explicit)),
            Operation::Unimplemented => {
                warn!("unimplemented opcode {} at {:04x}, halting", word, pc);
                return Ok(self.halt(HaltReason::Unimplemented(word)));
            }
            Operation::Jump => exec::jump(self.regs, args),
            Operation::SkipEqImm => exec::skip_eq_imm(self.regs, args),
            Operation::LoadImm => exec::load_imm(self.regs, args),
            Operation::AddImm => exec::add_imm(self.regs, args),
            Operation::Assign => exec::assign(self.regs, args),
            Operation::Or => exec::or(self.regs, args),
            Operation::And => exec::and(self.regs, args),
            Operation::Xor => exec::xor(self.regs, args),
            Operation::AddReg => exec::add_reg(self.regs, args),
            Operation::Sub => exec::sub(self.regs, args),
            Operation::ShiftRight => exec::shift_right(self.regs, args),
            Operation::SubInv => exec::sub_inv(self.regs, args),
            Operation::ShiftLeft => exec::shift_left(self.regs, args),
            Operation::RandomAnd => exec::random_and(self.regs, args, rng.next_byte()),
        };
        self.steps += 1;

        Ok(self.status)
    }

    fn halt(&mut self, reason: HaltReason) -> Status {
        info!("halted after {} steps: {}", self.steps, reason);
        self.status = Status::Halted(reason);
        self.status
    }

    /// Runs until the program halts. With a `limit`, gives up with
    /// `StepLimitExceeded` once that many instructions have executed.
    pub fn run<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        limit: Option<u64>,
    ) -> Result<HaltReason> {
        self.run_traced(rng, limit, |_: &Trace| {})
    }

    /// Like `run`, handing every instruction to `observer` before it executes.
    pub fn run_traced<R, F>(
        &mut self,
        rng: &mut R,
        limit: Option<u64>,
        mut observer: F,
    ) -> Result<HaltReason>
    where
        R: RandomSource + ?Sized,
        F: FnMut(&Trace),
    {
        loop {
            if let Status::Halted(reason) = self.step_traced(rng, &mut observer)? {
                return Ok(reason);
            }
            if let Some(limit) = limit {
                if self.steps >= limit {
                    bail!(ErrorKind::StepLimitExceeded(limit));
                }
            }
        }
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Vm")
            .field("regs", &self.regs)
            .field("steps", &self.steps)
            .field("status", &self.status)
            .field("program", &self.program)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Reg;
    use crate::program::Overflow;
    use crate::random::Sequence;

    fn vm_with(words: &[u16]) -> Vm {
        let bytes: Vec<u8> = words
            .iter()
            .flat_map(|w| vec![(w >> 8) as u8, (w & 0xFF) as u8])
            .collect();
        Vm::new(Program::from_bytes(&bytes, Overflow::Truncate).unwrap())
    }

    #[test]
    fn halt_first() {
        let mut vm = vm_with(&[0x0000]);
        let mut rng = Sequence::new(vec![0]);
        assert_eq!(vm.step(&mut rng).unwrap(), Status::Halted(HaltReason::Explicit));
        assert_eq!(vm.steps(), 0);
        assert_eq!(vm.regs(), RegFile::new());
    }

    #[test]
    fn halted_vm_stays_halted() {
        let mut vm = vm_with(&[0x0000]);
        let mut rng = Sequence::new(vec![0]);
        vm.step(&mut rng).unwrap();
        assert_eq!(vm.step(&mut rng).unwrap(), Status::Halted(HaltReason::Explicit));
        assert_eq!(vm.status(), Status::Halted(HaltReason::Explicit));
    }

    #[test]
    fn step_replaces_registers() {
        let mut vm = vm_with(&[0x6A3C, 0x0000]);
        let mut rng = Sequence::new(vec![0]);
        assert_eq!(vm.step(&mut rng).unwrap(), Status::Running);
        assert_eq!(vm.regs()[Reg::Va], 0x3C);
        assert_eq!(vm.regs().pc(), 2);
        assert_eq!(vm.steps(), 1);
    }

    #[test]
    fn unimplemented_halts() {
        let mut vm = vm_with(&[0x6001, 0xF00A]);
        let mut rng = Sequence::new(vec![0]);
        let reason = vm.run(&mut rng, None).unwrap();
        assert_eq!(reason, HaltReason::Unimplemented(InstructionWord(0xF00A)));
        assert_eq!(vm.steps(), 1);
    }

    #[test]
    fn random_and_draws_from_source() {
        let mut vm = vm_with(&[0xC30F, 0xC4F0]);
        let mut rng = Sequence::new(vec![0xAB, 0xCD]);
        vm.run(&mut rng, None).unwrap();
        assert_eq!(vm.regs()[Reg::V3], 0x0B);
        assert_eq!(vm.regs()[Reg::V4], 0xC0);
    }

    #[test]
    fn runaway_jump_faults() {
        let mut vm = vm_with(&[0x1800]);
        let mut rng = Sequence::new(vec![0]);
        let err = vm.run(&mut rng, None).unwrap_err();
        match err.kind() {
            &ErrorKind::PcOutOfBounds(0x800, _) => {}
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(vm.status(), Status::Running);
    }

    #[test]
    fn step_limit() {
        let mut vm = vm_with(&[0x1000]);
        let mut rng = Sequence::new(vec![0]);
        let err = vm.run(&mut rng, Some(10)).unwrap_err();
        match err.kind() {
            &ErrorKind::StepLimitExceeded(10) => {}
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(vm.steps(), 10);
    }

    #[test]
    fn observer_sees_every_instruction() {
        let mut vm = vm_with(&[0x6001, 0x7001, 0x0000]);
        let mut rng = Sequence::new(vec![0]);
        let mut seen = Vec::new();
        vm.run_traced(&mut rng, None, |t| seen.push((t.step, t.word, t.op)))
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (0, InstructionWord(0x6001), Operation::LoadImm),
                (1, InstructionWord(0x7001), Operation::AddImm),
                (2, InstructionWord(0x0000), Operation::Halt),
            ]
        );
    }
}
