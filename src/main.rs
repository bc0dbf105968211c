use ls8::config::Config;
use ls8::loader::load_program;
use ls8::vm::disasm::disassemble;
use ls8::vm::Cpu;
use std::io;
use std::path::PathBuf;
use std::process;

const USAGE: &str = "usage: ls8 [--config <file.toml>] [--disassemble] <program.ls8>";

struct Args {
    program: PathBuf,
    config: Option<PathBuf>,
    disassemble: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut program = None;
    let mut config = None;
    let mut disassemble = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--disassemble" => disassemble = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            path if program.is_none() => program = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument '{}'", extra)),
        }
    }

    Ok(Args {
        program: program.ok_or("missing program path")?,
        config,
        disassemble,
    })
}

fn main() {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            process::exit(2);
        }
    };

    // 1. Configuration
    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to load configuration '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 2. Program image
    let program = match load_program(&args.program) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Failed to load program '{}': {}", args.program.display(), e);
            process::exit(1);
        }
    };
    log::info!(
        "Loaded '{}' ({} bytes)",
        args.program.display(),
        program.len()
    );

    if args.disassemble {
        for line in disassemble(&program) {
            println!("{}", line);
        }
        return;
    }

    // 3. Execute
    let stdout = io::stdout();
    let mut cpu = Cpu::with_config(&config.vm, stdout.lock());
    if let Err(e) = cpu.load(&program) {
        log::error!("{}", e);
        process::exit(1);
    }
    match cpu.run() {
        Ok(summary) => log::info!(
            "Halted at {:#04X} after {} instructions",
            summary.halted_at,
            summary.steps
        ),
        Err(e) => {
            log::error!("Execution aborted at PC {:#04X}: {}", cpu.pc(), e);
            process::exit(1);
        }
    }
}
