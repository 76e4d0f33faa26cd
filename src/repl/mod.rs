//! REPL (Read-Eval-Print Loop).

use crate::interp::{builtins, EnvRef, Environment, Value};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".coral_history";

/// REPL state: a line editor plus one root environment that persists
/// across lines.
pub struct Repl {
    editor: DefaultEditor,
    env: EnvRef,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL with the prelude installed.
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let env = Environment::new().into_ref();
        builtins::install(&env);

        let history_path = home_dir().map(|home| home.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            env,
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL until EOF or `:quit`.
    pub fn run(&mut self) -> RlResult<()> {
        println!("coral REPL");
        println!("Type :quit or press ^D to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line == ":quit" || line == ":q" {
                        break;
                    }

                    self.eval_input(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Evaluate one input line and print its value.
    fn eval_input(&mut self, line: &str) {
        match crate::run("<repl>", &self.env, line, false) {
            Ok(Value::Undefined) => {}
            Ok(value) => println!("{value}"),
            Err(error) => eprintln!("{error}"),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
