//! Command line driver. Subcommands are dispatched from a registered map
//! keyed by the first positional argument; options come after the source
//! path and may each appear at most once.

use std::collections::HashMap;
use std::process::ExitCode;

use log::LevelFilter;

use amunc::{Compiler, CompilerOptions, SymbolCollector};

const EXECUTABLE_NAME_FLAG: &str = "-o";
const WARNINGS_FLAG: &str = "-w";
const WARNS_TO_ERRORS_FLAG: &str = "-werr";
const LINKER_EXTRA_FLAG: &str = "-l";

type Command = fn(&[String]) -> ExitCode;

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
        .expect("logger installs once");

    let arguments: Vec<String> = std::env::args().collect();

    let mut commands: HashMap<&'static str, Command> = HashMap::new();
    commands.insert("compile", compile_command);
    commands.insert("check", check_command);
    commands.insert("version", version_command);
    commands.insert("help", help_command);

    if arguments.len() < 2 {
        println!("Usage: {} <command> <options>", program_name(&arguments));
        return ExitCode::FAILURE;
    }

    let command_name = arguments[1].as_str();
    let Some(command) = commands.get(command_name) else {
        println!("Can't find command with name {command_name}");
        println!("Please run amunc help to get the list of available commands");
        return ExitCode::FAILURE;
    };

    command(&arguments)
}

fn compile_command(arguments: &[String]) -> ExitCode {
    let Some((source_file, options)) = parse_command_arguments(arguments) else {
        return ExitCode::FAILURE;
    };

    let mut compiler = Compiler::new(options);
    let mut backend = SymbolCollector::new();
    match compiler.compile_source_code(&source_file, &mut backend) {
        Ok(()) => {
            println!(
                "Successfully compiled {} ({} symbols)",
                source_file,
                backend.symbols.len()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn check_command(arguments: &[String]) -> ExitCode {
    let Some((source_file, options)) = parse_command_arguments(arguments) else {
        return ExitCode::FAILURE;
    };

    let mut compiler = Compiler::new(options);
    match compiler.check_source_code(&source_file) {
        Ok(()) => {
            println!("Source code in {source_file} is valid");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn version_command(_arguments: &[String]) -> ExitCode {
    println!("amunc {}", env!("CARGO_PKG_VERSION"));
    ExitCode::SUCCESS
}

fn help_command(arguments: &[String]) -> ExitCode {
    let program = program_name(arguments);
    println!("Usage: {program} <command> <options>");
    println!();
    println!("Commands:");
    println!("    compile <file>    Compile a source file");
    println!("    check   <file>    Parse and type check a source file");
    println!("    version           Print the compiler version");
    println!("    help              Print this help message");
    println!();
    println!("Options:");
    println!("    {EXECUTABLE_NAME_FLAG} <name>         Output file base name, default `output`");
    println!("    {WARNINGS_FLAG}                Report warnings");
    println!("    {WARNS_TO_ERRORS_FLAG}             Treat warnings as errors, implies {WARNINGS_FLAG}");
    println!("    {LINKER_EXTRA_FLAG} <flags...>     Forward the remaining arguments to the linker");
    ExitCode::SUCCESS
}

fn program_name(arguments: &[String]) -> &str {
    arguments.first().map(String::as_str).unwrap_or("amunc")
}

/// `<program> <command> <file> [options...]` — options start at index 3 and
/// each flag is fatal when passed twice.
fn parse_command_arguments(arguments: &[String]) -> Option<(String, CompilerOptions)> {
    if arguments.len() < 3 {
        println!(
            "Usage: {} {} <file> <options>",
            program_name(arguments),
            arguments[1]
        );
        return None;
    }

    let source_file = arguments[2].clone();
    let mut options = CompilerOptions::default();
    let mut received = [false; 4];

    let mut index = 3;
    while index < arguments.len() {
        let argument = arguments[index].as_str();
        match argument {
            EXECUTABLE_NAME_FLAG => {
                if !mark_option_once(&mut received, 0, argument) {
                    return None;
                }
                if index == arguments.len() - 1 {
                    println!("Flag `{argument}` expect executable name after it, but found nothing");
                    return None;
                }
                index += 1;
                options.output_file_name = arguments[index].clone();
            }
            WARNINGS_FLAG => {
                if !mark_option_once(&mut received, 1, argument) {
                    return None;
                }
                options.should_report_warns = true;
            }
            WARNS_TO_ERRORS_FLAG => {
                if !mark_option_once(&mut received, 2, argument) {
                    return None;
                }
                options.convert_warns_to_errors = true;
                options.should_report_warns = true;
            }
            LINKER_EXTRA_FLAG => {
                if !mark_option_once(&mut received, 3, argument) {
                    return None;
                }
                // Everything after -l belongs to the external linker.
                options
                    .linker_extra_flags
                    .extend(arguments[index + 1..].iter().cloned());
                return Some((source_file, options));
            }
            _ => {
                println!("ERROR: Unknown compiler flag with name `{argument}`");
                println!(
                    "Please run `{} help` to see all available options",
                    program_name(arguments)
                );
                return None;
            }
        }
        index += 1;
    }

    Some((source_file, options))
}

fn mark_option_once(received: &mut [bool; 4], index: usize, argument: &str) -> bool {
    if received[index] {
        println!("ERROR: Flag `{argument}` is passed twice");
        return false;
    }
    received[index] = true;
    true
}
