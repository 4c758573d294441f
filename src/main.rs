//! Sapling Programming Language - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sapling::frontend::{CompileConfig, CompileError, Compiler};
use sapling::util::diagnostic::{Diagnostic, TextEmitter};
use sapling::util::logger::{self, LogLevel};
use sapling::util::span::SourceFile;
use sapling::vm::{Value, Vm, VmConfig};
use sapling::{NAME, VERSION};
use std::error::Error as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Compiler for the Sapling language
#[derive(Parser, Debug)]
#[command(name = "sapling")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (overrides --verbose)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Compile configuration (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream of a source file
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the typed AST of a source file
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compile a source file to IR text
    Build {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Compile and run a source file
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    logger::init(LogLevel::select(args.verbose, args.log_level));

    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => CompileConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => CompileConfig::default(),
    };
    let compiler = Compiler::with_config(config);

    let (file, command) = match &args.command {
        Commands::Tokens { file }
        | Commands::Parse { file }
        | Commands::Build { file, .. }
        | Commands::Run { file } => (file, &args.command),
    };
    let source = read_source(file)?;

    let result = match command {
        Commands::Tokens { .. } => compiler.lex(&source.content).map(|tokens| {
            for token in tokens {
                println!("{} {:<22} {:?}", token.span, token.kind.to_string(), token.text);
            }
        }),
        Commands::Parse { .. } => compiler
            .parse(&source.content)
            .map(|program| print!("{}", program)),
        Commands::Build { output, .. } => match compiler.compile(&source.content) {
            Ok(module) => {
                write_output(output.as_deref(), &module.to_string())?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Run { .. } => match compiler.compile(&source.content) {
            Ok(module) => {
                let vm_config = VmConfig {
                    echo_stdout: true,
                    ..VmConfig::default()
                };
                let value = Vm::with_config(&module, vm_config)
                    .run(&compiler.config().entry_name)
                    .context("Runtime error")?;
                if args.verbose && value != Value::Void {
                    eprintln!("=> {}", value);
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            report(&e, &source);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_source(path: &Path) -> Result<SourceFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(SourceFile::new(path.display().to_string(), content))
}

fn write_output(
    path: Option<&Path>,
    text: &str,
) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write output: {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn report(
    error: &CompileError,
    source: &SourceFile,
) {
    let message = match error.source() {
        Some(inner) => format!("{}: {}", error, inner),
        None => error.to_string(),
    };
    let diagnostic = Diagnostic::error(message, error.span());
    eprint!("{}", TextEmitter::new().render(&diagnostic, Some(source)));
}
