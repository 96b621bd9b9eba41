extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate rand;
extern crate tinychip;

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process::exit;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tinychip::{Overflow, Program, Trace, Vm};

error_chain! {
    links {
        Vm(tinychip::Error, tinychip::ErrorKind);
    }

    foreign_links {
        Io(io::Error);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TraceFormat {
    Hex,
    Bin,
}

#[derive(Debug)]
struct CommandArgs {
    program_file_name: String,
    seed: Option<u64>,
    max_steps: Option<u64>,
    trace: Option<TraceFormat>,
    overflow: Overflow,
}

fn is_u64(value: String) -> std::result::Result<(), String> {
    value
        .parse::<u64>()
        .map(|_| ())
        .map_err(|e| format!("'{}' is not a valid number: {}", value, e))
}

fn app<'a, 'b>() -> clap::App<'a, 'b> {
    use clap::{App, Arg};

    App::new("tinychip")
        .about("Runs a program for a tiny CHIP-8 style CPU")
        .arg(
            Arg::with_name("PROGRAM")
                .help("binary program file to run")
                .required(true),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .value_name("seed")
                .help("Seed for the random source. Defaults to the current time.")
                .validator(is_u64)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("max steps")
                .short("m")
                .long("max-steps")
                .value_name("n")
                .help("Give up after executing this many instructions.")
                .validator(is_u64)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("trace")
                .short("t")
                .long("trace")
                .value_name("format")
                .help("Print every step with the register file in hex or binary.")
                .possible_values(&["hex", "bin"])
                .takes_value(true),
        )
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("Refuse programs larger than the program image instead of cutting them."),
        )
}

impl CommandArgs {
    fn parse() -> CommandArgs {
        CommandArgs::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    fn from_args<I, T>(args: I) -> clap::Result<CommandArgs>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app().get_matches_from_safe(args)?;

        let parse_u64 = |name: &str| matches.value_of(name).and_then(|s| s.parse::<u64>().ok());

        let trace = matches.value_of("trace").map(|format| match format {
            "bin" => TraceFormat::Bin,
            _ => TraceFormat::Hex,
        });

        let overflow = if matches.is_present("strict") {
            Overflow::Reject
        } else {
            Overflow::Truncate
        };

        Ok(CommandArgs {
            program_file_name: matches.value_of("PROGRAM").unwrap_or_default().to_string(),
            seed: parse_u64("seed"),
            max_steps: parse_u64("max steps"),
            trace,
            overflow,
        })
    }
}

fn read_program<P: AsRef<Path>>(path: P, overflow: Overflow) -> Result<Program> {
    let file = File::open(path.as_ref())
        .chain_err(|| format!("can't open {}", path.as_ref().display()))?;
    let mut reader = BufReader::new(file);
    let program = Program::from_reader(&mut reader, overflow)?;
    Ok(program)
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn print_step(format: TraceFormat, trace: &Trace) {
    println!("{}", trace.word);
    match format {
        TraceFormat::Hex => println!("i: {}, regFile: {}", trace.step, trace.regs),
        TraceFormat::Bin => println!("i: {}, regFile: {}", trace.step, trace.regs.bin()),
    }
}

/// Exit status for an error: 2 when the program itself misbehaved, 1 for
/// everything around it.
fn exit_code(e: &Error) -> i32 {
    use tinychip::ErrorKind::*;

    match *e.kind() {
        ErrorKind::Vm(PcOutOfBounds(..))
        | ErrorKind::Vm(MisalignedPc(_))
        | ErrorKind::Vm(StepLimitExceeded(_)) => 2,
        _ => 1,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match do_run() {
        Ok(_) => exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.iter().skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            exit(exit_code(&e));
        }
    }
}

fn do_run() -> Result<()> {
    let args = CommandArgs::parse();

    let program = read_program(&args.program_file_name, args.overflow)?;
    let seed = args.seed.unwrap_or_else(time_seed);
    debug!("random source seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut vm = Vm::new(program);
    let reason = match args.trace {
        Some(format) => vm.run_traced(&mut rng, args.max_steps, |t| print_step(format, t))?,
        None => vm.run(&mut rng, args.max_steps)?,
    };
    info!("{} after {} steps", reason, vm.steps());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_exit_with_two() {
        let e: Error = tinychip::Error::from(tinychip::ErrorKind::PcOutOfBounds(2048, 2048)).into();
        assert_eq!(exit_code(&e), 2);
        let e: Error = tinychip::Error::from(tinychip::ErrorKind::StepLimitExceeded(5)).into();
        assert_eq!(exit_code(&e), 2);
        let e: Error = tinychip::Error::from(tinychip::ErrorKind::MisalignedPc(3)).into();
        assert_eq!(exit_code(&e), 2);
    }

    #[test]
    fn load_errors_exit_with_one() {
        let e: Error = tinychip::Error::from(tinychip::ErrorKind::ProgramTooLarge(4096, 2048)).into();
        assert_eq!(exit_code(&e), 1);
        let e = read_program("/nonexistent/program.bin", Overflow::Truncate).unwrap_err();
        assert_eq!(exit_code(&e), 1);
    }

    #[test]
    fn number_validation() {
        assert!(is_u64("42".to_string()).is_ok());
        assert!(is_u64("-1".to_string()).is_err());
        assert!(is_u64("lots".to_string()).is_err());
    }

    #[test]
    fn program_file_is_required() {
        let err = CommandArgs::from_args(vec!["tinychip"]).unwrap_err();
        assert_eq!(err.kind, clap::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn defaults() {
        let args = CommandArgs::from_args(vec!["tinychip", "prog.bin"]).unwrap();
        assert_eq!(args.program_file_name, "prog.bin");
        assert_eq!(args.seed, None);
        assert_eq!(args.max_steps, None);
        assert_eq!(args.trace, None);
        assert_eq!(args.overflow, Overflow::Truncate);
    }

    #[test]
    fn numeric_options() {
        let args =
            CommandArgs::from_args(vec!["tinychip", "--seed", "7", "-m", "10", "prog.bin"]).unwrap();
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.max_steps, Some(10));

        let err = CommandArgs::from_args(vec!["tinychip", "--seed", "lots", "prog.bin"]).unwrap_err();
        assert_eq!(err.kind, clap::ErrorKind::ValueValidation);
        let err = CommandArgs::from_args(vec!["tinychip", "--max-steps", "-1", "prog.bin"]);
        assert!(err.is_err());
    }

    #[test]
    fn trace_format() {
        let args = CommandArgs::from_args(vec!["tinychip", "--trace", "bin", "prog.bin"]).unwrap();
        assert_eq!(args.trace, Some(TraceFormat::Bin));
        let args = CommandArgs::from_args(vec!["tinychip", "-t", "hex", "prog.bin"]).unwrap();
        assert_eq!(args.trace, Some(TraceFormat::Hex));

        let err = CommandArgs::from_args(vec!["tinychip", "--trace", "oct", "prog.bin"]).unwrap_err();
        assert_eq!(err.kind, clap::ErrorKind::InvalidValue);
    }

    #[test]
    fn strict_rejects_oversized_programs() {
        let args = CommandArgs::from_args(vec!["tinychip", "--strict", "prog.bin"]).unwrap();
        assert_eq!(args.overflow, Overflow::Reject);
    }
}
