//! Interactive command - a line-oriented evaluation form.
//!
//! The form keeps one session alive across commands, so the image and key
//! can be changed and the sheet re-evaluated without restarting.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use omr_eval_adapters::{DataUrlImageSource, FsImageSource, GeminiEvaluator};
use omr_eval_core::{
    AnswerKey, Evaluator, ImageSource, ProgressSink, ResultOutput, Session, SessionError, SessionState,
    MISSING_INPUT_MESSAGE,
};
use tracing::debug;

use super::args::{read_key_file, KeyArgs, ModelArgs, OutputArgs};
use super::evaluate::write_report;
use crate::config::AppConfig;

const HELP: &str = "\
Commands:
  image <path|url>  select the answer-sheet image (file or data: URL)
  key <text>        set the answer key, e.g. 1:A,2:B (empty clears it)
  key-file <path>   read the answer key from a file
  sample-key        use the built-in sample key
  status            show the form state
  evaluate          evaluate the sheet
  show              show the last result again
  help              show this help
  quit              leave";

/// Arguments for the interactive form.
#[derive(Args, Clone, Debug, Default)]
pub struct InteractiveArgs {
    #[command(flatten)]
    pub keys: KeyArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl InteractiveArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(self, config: &AppConfig) -> Self {
        Self {
            keys: self.keys.with_config(config),
            model: self.model.with_config(config),
            output: self.output.with_config(config),
        }
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `image <path>`
    Image(PathBuf),
    /// `key <text>`
    Key(String),
    /// `key-file <path>`
    KeyFile(PathBuf),
    /// `sample-key`
    SampleKey,
    /// `status`
    Status,
    /// `evaluate`
    Evaluate,
    /// `show`
    Show,
    /// `help`
    Help,
    /// `quit`
    Quit,
    /// Blank line.
    Empty,
}

impl Command {
    /// Parses a line; the error is the message to show.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word {
            "" => Ok(Self::Empty),
            "image" if rest.is_empty() => Err("usage: image <path>".to_string()),
            "image" => Ok(Self::Image(PathBuf::from(rest))),
            "key" => Ok(Self::Key(rest.to_string())),
            "key-file" if rest.is_empty() => Err("usage: key-file <path>".to_string()),
            "key-file" => Ok(Self::KeyFile(PathBuf::from(rest))),
            "sample-key" => Ok(Self::SampleKey),
            "status" => Ok(Self::Status),
            "evaluate" | "eval" => Ok(Self::Evaluate),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

/// The form: a session plus the adapters it talks to.
pub struct Form<'a, W: Write> {
    session: Session,
    evaluator: &'a dyn Evaluator,
    progress: &'a dyn ProgressSink,
    output: &'a dyn ResultOutput,
    out: W,
}

impl<'a, W: Write> Form<'a, W> {
    /// Creates an empty form.
    pub fn new(
        evaluator: &'a dyn Evaluator,
        progress: &'a dyn ProgressSink,
        output: &'a dyn ResultOutput,
        out: W,
    ) -> Self {
        Self {
            session: Session::new(),
            evaluator,
            progress,
            output,
            out,
        }
    }

    /// The underlying session.
    #[cfg(test)]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Pre-fills the answer key.
    pub fn set_answer_key(&mut self, key: AnswerKey) {
        self.session.set_answer_key(key);
    }

    /// Reads commands until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        writeln!(
            self.out,
            "OMR evaluator ({}). Type 'help' for commands.",
            self.evaluator.model()
        )?;
        self.prompt()?;
        for line in input.lines() {
            let line = line?;
            let keep_going = match Command::parse(&line) {
                Ok(command) => self.handle(command).await?,
                Err(message) => {
                    writeln!(self.out, "{message}")?;
                    true
                }
            };
            if !keep_going {
                return Ok(());
            }
            self.prompt()?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "omr> ")?;
        self.out.flush()?;
        Ok(())
    }

    /// Applies one command. Returns `false` when the form should close.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub async fn handle(&mut self, command: Command) -> Result<bool> {
        debug!(?command, state = self.session.state().label(), "form command");
        match command {
            Command::Image(path) => self.select_image(path)?,
            Command::Key(text) => {
                self.session.set_answer_key(AnswerKey::new(text));
                self.report_inputs()?;
            }
            Command::KeyFile(path) => match read_key_file(&path) {
                Ok(key) => {
                    self.session.set_answer_key(key);
                    self.report_inputs()?;
                }
                Err(e) => writeln!(self.out, "error: {e:#}")?,
            },
            Command::SampleKey => {
                self.session.set_answer_key(AnswerKey::sample());
                self.report_inputs()?;
            }
            Command::Status => self.status()?,
            Command::Evaluate => self.evaluate().await?,
            Command::Show => self.show()?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(false),
            Command::Empty => {}
        }
        Ok(true)
    }

    fn select_image(&mut self, path: PathBuf) -> Result<()> {
        if let Some(url) = path.to_str().filter(|p| DataUrlImageSource::is_data_url(p)) {
            return self.select_inline_image(url);
        }
        let source = match FsImageSource::open(path) {
            Ok(source) => source,
            Err(e) => {
                writeln!(self.out, "error: {e:#}")?;
                return Ok(());
            }
        };
        match source.dimensions() {
            Ok((w, h)) => writeln!(self.out, "Selected {} ({w}x{h})", source.path().display())?,
            Err(_) => writeln!(self.out, "Selected {}", source.path().display())?,
        }
        self.session.select_image(Arc::new(source));
        self.report_inputs()
    }

    fn select_inline_image(&mut self, url: &str) -> Result<()> {
        match DataUrlImageSource::parse(url) {
            Ok(source) => {
                writeln!(self.out, "Selected {}", source.name())?;
                self.session.select_image(Arc::new(source));
                self.report_inputs()
            }
            Err(e) => {
                writeln!(self.out, "error: {e:#}")?;
                Ok(())
            }
        }
    }

    fn report_inputs(&mut self) -> Result<()> {
        let submit = if self.session.can_submit() {
            "ready to evaluate"
        } else {
            "waiting for image and answer key"
        };
        writeln!(self.out, "{submit}")?;
        Ok(())
    }

    fn status(&mut self) -> Result<()> {
        let key = self.session.answer_key();
        let key_status = if key.is_present() {
            format!("{} characters", key.as_str().chars().count())
        } else {
            "not set".to_string()
        };
        writeln!(self.out, "state:      {}", self.session.state().label())?;
        writeln!(
            self.out,
            "image:      {}",
            self.session.image_name().unwrap_or("not set")
        )?;
        writeln!(self.out, "answer key: {key_status}")?;
        writeln!(
            self.out,
            "evaluate:   {}",
            if self.session.can_submit() { "enabled" } else { "disabled" }
        )?;
        Ok(())
    }

    async fn evaluate(&mut self) -> Result<()> {
        let submitted = self
            .session
            .submit(self.evaluator, self.progress)
            .await
            .map(|_| ());
        match submitted {
            Ok(()) => self.show(),
            Err(SessionError::MissingInput) => {
                writeln!(self.out, "{MISSING_INPUT_MESSAGE}")?;
                Ok(())
            }
            Err(e @ SessionError::AlreadyEvaluating) => {
                writeln!(self.out, "{e}")?;
                Ok(())
            }
        }
    }

    fn show(&mut self) -> Result<()> {
        match self.session.state() {
            SessionState::Succeeded(_) => {
                write_report(&self.session, self.evaluator.model(), self.output)?;
            }
            SessionState::Failed(message) => {
                writeln!(self.out, "Evaluation Failed: {message}")?;
            }
            _ => writeln!(self.out, "No result yet.")?,
        }
        Ok(())
    }
}

/// Run the interactive command on stdin/stdout.
///
/// Expects `args` to have been processed through `with_config()` first.
///
/// # Errors
///
/// Fails on missing credentials or an unreadable key file, or if the
/// terminal cannot be read or written.
pub async fn run(args: &InteractiveArgs) -> Result<()> {
    let evaluator = GeminiEvaluator::new(args.model.gemini_config()?)?;
    let options = args.output.options();
    let spinner = options.spinner();
    let output = options.result_output();

    let mut form = Form::new(&evaluator, &spinner, output.as_ref(), io::stdout());
    let key = args.keys.resolve()?;
    if key.is_present() {
        form.set_answer_key(key);
    }
    form.run(io::stdin().lock()).await
}
