use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use speak_compiler::{parse_file, tokenize, Parsed, SpeakError};
use speak_compiler::token::TokenKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "speakc")]
#[command(about = "Check, inspect and format Speak interface definition files", long_about = None)]
struct Cli {
    /// Log parser activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of each file
    Tokens {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Parse each file and report every diagnostic
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the AST of a file as JSON
    Ast {
        input: PathBuf,

        /// Indent the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print a file in canonical form
    Fmt {
        input: PathBuf,
    },

    /// Print the package dependencies observed in each file
    Deps {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(parsed: &Parsed) {
    for diag in &parsed.diagnostics {
        eprintln!("{}", diag);
    }
}

/// Returns whether every input was accepted.
fn run(command: &Commands) -> Result<bool, SpeakError> {
    match command {
        Commands::Tokens { files } => {
            let mut ok = true;
            for path in files {
                let text = fs::read_to_string(path).map_err(SpeakError::Io)?;
                let name = path.display().to_string();
                let mut lexer = tokenize(&name, &text);
                while let Some(token) = lexer.next() {
                    if token.kind == TokenKind::Error {
                        eprintln!("{}", lexer.diagnostic(&token, token.text.clone()));
                        ok = false;
                    } else {
                        let at = lexer.location(token.pos);
                        println!("{}:{}\t{}", name, at, token);
                    }
                }
            }
            Ok(ok)
        }

        Commands::Check { files } => {
            let mut ok = true;
            for path in files {
                let parsed = parse_file(path);
                report(&parsed);
                ok &= parsed.is_ok();
            }
            Ok(ok)
        }

        Commands::Ast { input, pretty } => {
            let file = parse_file(input).into_result()?;
            let json = if *pretty {
                serde_json::to_string_pretty(&file)?
            } else {
                serde_json::to_string(&file)?
            };
            println!("{}", json);
            Ok(true)
        }

        Commands::Fmt { input } => {
            let file = parse_file(input).into_result()?;
            print!("{}", file);
            Ok(true)
        }

        Commands::Deps { files } => {
            let mut ok = true;
            for path in files {
                let parsed = parse_file(path);
                if !parsed.is_ok() {
                    report(&parsed);
                    ok = false;
                    continue;
                }
                let package = parsed.file.package.as_deref().unwrap_or("<none>");
                for dependency in parsed.file.referenced_packages() {
                    println!("{} -> {}", package, dependency);
                }
            }
            Ok(ok)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(SpeakError::Rejected { diagnostics, .. }) => {
            for diag in &diagnostics {
                eprintln!("{}", diag);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
