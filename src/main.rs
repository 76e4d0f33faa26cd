//! coral CLI.

use clap::Parser;
use coral::interp::{builtins, Environment};
use coral::repl::Repl;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coral", version, about = "coral scripting language")]
struct Cli {
    /// Script file to run; starts a REPL when omitted
    file: Option<PathBuf>,
    /// Print the AST before evaluation
    #[arg(long)]
    ast: bool,
}

fn main() {
    let cli = Cli::parse();

    match cli.file {
        Some(file) => run_file(&file, cli.ast),
        None => {
            let result = Repl::new().and_then(|mut repl| repl.run());
            if let Err(err) = result {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    }
}

fn run_file(file: &PathBuf, print_ast: bool) {
    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}: {err}", file.display());
            std::process::exit(1);
        }
    };

    let env = Environment::new().into_ref();
    builtins::install(&env);

    let path = file.display().to_string();
    if let Err(err) = coral::run(&path, &env, &source, print_ast) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
