//! The `rondo` command: read an ASP-Core-2 program, ground it,
//! and print the ground program.

use std::fs::{read_to_string, write};
use std::io::{stdin, Read};

use anyhow::{anyhow, Context as _, Result};
use atty::Stream;
use clap::{Parser, Subcommand};

use rondo_ground::ground;
use rondo_syntax::{AspCore2Lexer, AspCore2Parser, Lex as _, Parse as _, Tokens};
use rondo_tracer::Trace;

#[derive(Parser)]
#[command(name = "rondo", version, about = "An ASP-Core-2 grounder")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the variables in a program with values.
    Ground {
        /// Input file; standard input if absent or `-`.
        #[arg(short = 'f', long = "file")]
        infile: Option<String>,

        /// Output file; standard output if absent.
        #[arg(short = 'o', long = "output")]
        outfile: Option<String>,

        /// Report grounding progress on standard error.
        #[arg(long)]
        trace: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Ground {
            infile,
            outfile,
            trace,
        } => {
            let trace = if trace { Trace::all() } else { Trace::none() };
            let input = read_file(infile.as_deref())?;
            let (rest, tokens) = AspCore2Lexer::lex(&input).map_err(|e| anyhow!(e.to_string()))?;
            if !rest.is_empty() {
                return Err(anyhow!("unrecognized input: {rest}"));
            }
            let (rest, program) = AspCore2Parser::parse(Tokens::new(&tokens[..]))
                .map_err(|e| anyhow!(e.to_string()))?;
            if !rest.is_empty() {
                return Err(anyhow!("trailing tokens after the last rule"));
            }
            let ground = ground(program, trace)?;
            write_file(outfile.as_deref(), &ground.to_string())
        }
    }
}

/// Read a file or standard input and return the content as a string.
fn read_file(filename: Option<&str>) -> Result<String> {
    match filename {
        None | Some("-") => {
            if atty::is(Stream::Stdin) && atty::is(Stream::Stdout) {
                eprintln!("Reading rules from the terminal; finish with Ctrl-D.");
            }
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Reading from stdin")?;
            Ok(buffer)
        }
        Some(filename) => read_to_string(filename).with_context(|| format!("Reading {filename}")),
    }
}

/// Write to a file or standard output.
fn write_file(filename: Option<&str>, content: &str) -> Result<()> {
    match filename {
        None => {
            print!("{content}");
            Ok(())
        }
        Some(filename) => {
            write(filename, content).with_context(|| format!("Writing {filename}"))
        }
    }
}
