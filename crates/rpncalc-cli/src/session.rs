//! One interactive calculator session.

use std::fs;
use std::path::{Path, PathBuf};

use rpncalc::format::render_stack;
use rpncalc::{Engine, EngineConfig, Formatter, PlainFormatter, SavedState};

use crate::command::{Command, HELP, Line, parse_line};
use crate::error::CliError;
use crate::format::{EngineeringFormatter, FixedFormatter};
use crate::plot::TextPlotSink;
use crate::Options;

/// Whether the session should keep reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    engine: Engine,
    formatter: Box<dyn Formatter>,
    state_path: Option<PathBuf>,
    /// A multi-line `:def` still reading its body.
    pending_def: Option<String>,
}

impl Session {
    pub fn new(options: &Options) -> Result<Self, CliError> {
        let mut config = match &options.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        if options.no_startup {
            config.startup.clear();
        }

        let formatter: Box<dyn Formatter> = match (options.eng, options.precision) {
            (true, precision) => Box::new(EngineeringFormatter {
                precision: precision.unwrap_or(3),
            }),
            (false, Some(precision)) => Box::new(FixedFormatter { precision }),
            (false, None) => Box::new(PlainFormatter),
        };

        let mut engine = Engine::with_config(config);
        engine.set_plot_sink(Box::new(TextPlotSink::default()));

        let mut session = Self {
            engine,
            formatter,
            state_path: options.state.clone(),
            pending_def: None,
        };
        if let Some(path) = options.state.clone()
            && path.exists()
        {
            session.load(&path)?;
        }
        Ok(session)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Whether a `:def` body is being read.
    pub fn reading_definition(&self) -> bool {
        self.pending_def.is_some()
    }

    /// Handle one input line, returning the text to print.
    pub fn handle(&mut self, line: &str) -> Result<(Flow, Vec<String>), CliError> {
        if let Some(mut source) = self.pending_def.take() {
            if !line.trim().is_empty() {
                source.push('\n');
                source.push_str(line.trim_end_matches(['\r', '\n']));
                self.pending_def = Some(source);
                return Ok((Flow::Continue, Vec::new()));
            }
            let _ = self.engine.define_function(&source);
            return Ok((Flow::Continue, self.status()));
        }

        let parsed = match parse_line(line) {
            Ok(parsed) => parsed,
            Err(e) => return Ok((Flow::Continue, vec![format!("Error: {}", e)])),
        };
        match parsed {
            Line::Token(token) => self.engine.submit(token.as_str()),
            Line::Enter => self.engine.commit(),
            Line::Command(command) => return self.command(command),
        }
        Ok((Flow::Continue, self.status()))
    }

    fn command(&mut self, command: Command) -> Result<(Flow, Vec<String>), CliError> {
        let listing = match command {
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Quit => {
                self.save_on_exit()?;
                return Ok((Flow::Quit, Vec::new()));
            }
            Command::Vars => self
                .engine
                .export_locals()
                .iter()
                .map(|(name, value)| format!("{} = {}", name, self.formatter.format(value)))
                .collect(),
            Command::Funcs => self.engine.user_functions().into_values().collect(),
            Command::Names => vec![self.engine.evaluation_names().join(" ")],
            Command::Buttons => vec![self.engine.buttons().join(" ")],
            Command::Def(source) => {
                if source.trim_end().ends_with(':') {
                    self.pending_def = Some(source);
                    return Ok((Flow::Continue, Vec::new()));
                }
                let _ = self.engine.define_function(&source);
                return Ok((Flow::Continue, self.status()));
            }
            Command::RemoveFunction(name) => {
                self.engine.remove_user_function(name.as_deref());
                return Ok((Flow::Continue, self.status()));
            }
            Command::DeleteVar(name) => {
                let _ = self.engine.delete_local(&name);
                return Ok((Flow::Continue, self.status()));
            }
            Command::ClearVars => {
                self.engine.clear_all_variables();
                return Ok((Flow::Continue, self.status()));
            }
            Command::ClearStack => {
                self.engine.clear_stack();
                return Ok((Flow::Continue, self.status()));
            }
            Command::ClearLevel(level) => {
                let _ = self.engine.clear_level(level - 1);
                return Ok((Flow::Continue, self.status()));
            }
            Command::Undo(discard) => {
                let _ = self.engine.undo(discard);
                return Ok((Flow::Continue, self.status()));
            }
            Command::Invert(invert) => {
                self.engine.set_invert_lists(invert);
                vec![format!("invert_lists = {}", invert)]
            }
            Command::Save(path) => match path.or_else(|| self.state_path.clone()) {
                Some(path) => {
                    self.save(&path)?;
                    vec![format!("Saved to {}", path.display())]
                }
                None => vec!["Error: no state file; use :save <path>".to_string()],
            },
        };
        Ok((Flow::Continue, listing))
    }

    /// The stack followed by the engine's status message.
    pub fn status(&self) -> Vec<String> {
        let mut lines = render_stack(&self.engine.stack(), self.formatter.as_ref());
        if let Some(message) = self.engine.message() {
            lines.push(message.to_string());
        }
        lines
    }

    pub fn load(&mut self, path: &Path) -> Result<(), CliError> {
        let text = fs::read_to_string(path).map_err(|e| CliError::StateRead {
            path: path.to_owned(),
            source: e,
        })?;
        let state: SavedState = serde_json::from_str(&text).map_err(|e| CliError::StateFormat {
            path: path.to_owned(),
            source: e,
        })?;
        if let Err(e) = self.engine.restore_state(state) {
            log::warn!("state from {} restored with errors: {}", path.display(), e);
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        let state = self.engine.save_state();
        let text = serde_json::to_string_pretty(&state).map_err(|e| CliError::StateFormat {
            path: path.to_owned(),
            source: e,
        })?;
        fs::write(path, text).map_err(|e| CliError::StateWrite {
            path: path.to_owned(),
            source: e,
        })?;
        log::info!("saved session to {}", path.display());
        Ok(())
    }

    /// Save to the `--state` file, if one was given.
    pub fn save_on_exit(&self) -> Result<(), CliError> {
        match &self.state_path {
            Some(path) => self.save(path),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpncalc::Value;

    fn session() -> Session {
        let options = Options {
            config: None,
            state: None,
            no_startup: true,
            eng: false,
            precision: None,
        };
        Session::new(&options).unwrap()
    }

    fn feed(session: &mut Session, lines: &[&str]) -> Vec<String> {
        let mut last = Vec::new();
        for line in lines {
            let (_, output) = session.handle(line).unwrap();
            last = output;
        }
        last
    }

    #[test]
    fn keystroke_arithmetic() {
        let mut s = session();
        let output = feed(&mut s, &["3", "", "4", "+"]);
        assert_eq!(output, vec!["X: 7"]);
    }

    #[test]
    fn errors_are_shown_after_the_stack() {
        let mut s = session();
        let output = feed(&mut s, &["1", "", "nosuchname", ""]);
        assert_eq!(output[..2], ["Y: 1", "X: nosuchname"]);
        assert!(output[2].starts_with("Error:"));
    }

    #[test]
    fn multi_line_definition() {
        let mut s = session();
        feed(&mut s, &[":def def triple(x):", "    y = 3 * x", "    return y", ""]);
        assert!(s.engine().user_functions().contains_key("triple"));
        feed(&mut s, &["triple(2)", ""]);
        assert_eq!(s.engine().read(0), Some(Value::Int(6)));
    }

    #[test]
    fn drop_counts_from_one() {
        let mut s = session();
        feed(&mut s, &["1", "", "2", ""]);
        feed(&mut s, &[":drop 1"]);
        assert_eq!(s.engine().stack(), vec![Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut s = session();
        let (flow, _) = s.handle(":quit").unwrap();
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut s = session();
        let (flow, output) = s.handle(":nope").unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(output[0].starts_with("Error:"));
    }
}
