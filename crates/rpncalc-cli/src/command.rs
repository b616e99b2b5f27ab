//! Input line parsing.
//!
//! A line is either a token for the engine or, when it starts with `:`, a
//! session command.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// Submit the text as one token.
    Token(String),
    /// An empty line: commit X.
    Enter,
    Command(Command),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// List user variables.
    Vars,
    /// List user functions with their source.
    Funcs,
    /// List every name the evaluator can see.
    Names,
    /// List button names.
    Buttons,
    /// Define a function from `def ...` source.
    Def(String),
    /// Remove one user function, or all.
    RemoveFunction(Option<String>),
    DeleteVar(String),
    ClearVars,
    ClearStack,
    /// Remove one stack level (1 = X).
    ClearLevel(usize),
    Undo(usize),
    Invert(bool),
    /// Save the session, to the given path or the `--state` file.
    Save(Option<PathBuf>),
}

pub const HELP: &str = "\
Each line is one token: a number, a name, an expression or a button such as
+ - * / swap drop undo. An empty line is enter.

Session commands:
  :help               Show this text
  :quit               Save (with --state) and exit
  :vars               List variables
  :funcs              List user functions
  :names              List every name the evaluator knows
  :buttons            List button names
  :def <source>       Define a function; a header ending in ':' reads an
                      indented body until an empty line
  :rmfunc [name]      Remove a user function, or all of them
  :del <name>         Delete a variable
  :clearvars          Delete every variable
  :clear              Clear the stack
  :drop <level>       Remove a stack level (1 = X)
  :undo [n]           Undo, discarding n extra snapshots first
  :invert on|off      List order for stack_to_list and iterable_to_stack
  :save [path]        Save the session as JSON";

pub fn parse_line(line: &str) -> Result<Line, String> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return Ok(Line::Enter);
    }
    match trimmed.trim_start().strip_prefix(':') {
        Some(rest) => parse_command(rest).map(Line::Command),
        None => Ok(Line::Token(trimmed.trim().to_string())),
    }
}

fn parse_command(text: &str) -> Result<Command, String> {
    let (name, rest) = match text.trim().split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (text.trim(), ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match (name, argument) {
        ("help" | "h", None) => Command::Help,
        ("quit" | "q" | "exit", None) => Command::Quit,
        ("vars", None) => Command::Vars,
        ("funcs", None) => Command::Funcs,
        ("names", None) => Command::Names,
        ("buttons", None) => Command::Buttons,
        ("def", Some(source)) => Command::Def(source),
        ("rmfunc", name) => Command::RemoveFunction(name),
        ("del", Some(name)) => Command::DeleteVar(name),
        ("clearvars", None) => Command::ClearVars,
        ("clear", None) => Command::ClearStack,
        ("drop", Some(level)) => match level.parse::<usize>() {
            Ok(n) if n >= 1 => Command::ClearLevel(n),
            _ => return Err(format!("bad stack level '{}'", level)),
        },
        ("undo", None) => Command::Undo(0),
        ("undo", Some(n)) => Command::Undo(n.parse().map_err(|_| format!("bad count '{}'", n))?),
        ("invert", Some(flag)) => match flag.as_str() {
            "on" | "true" => Command::Invert(true),
            "off" | "false" => Command::Invert(false),
            _ => return Err(format!("expected on or off, not '{}'", flag)),
        },
        ("save", path) => Command::Save(path.map(PathBuf::from)),
        (name, _) => return Err(format!("unknown command ':{}' (try :help)", name)),
    };
    Ok(command)
}
