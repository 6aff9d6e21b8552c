//! Line-oriented prompting seam.
//!
//! The collector only talks to a [`Prompter`]; the terminal, a non-interactive
//! run and tests each provide their own.
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use colored::Colorize;
use thiserror::Error;

use crate::schema::FieldNode;
use crate::value::Value;

const DESCRIPTION_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("interrupted")]
    Interrupted,
    #[error("failed to read answer: {0}")]
    Io(#[from] io::Error),
}

/// One request for a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub label: String,
    pub description: String,
    /// Shown in parentheses; an empty answer accepts it.
    pub default: Option<String>,
}

impl Prompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), description: String::new(), default: None }
    }

    /// `<path>` plus ` *` when required, offering the schema default.
    pub fn for_field(node: &FieldNode) -> Self {
        let mut label = node.path.to_string();
        if node.required {
            label.push_str(" *");
        }
        Self {
            label,
            description: truncate_description(&node.description),
            default: node.default.as_ref().map(Value::to_inline_string),
        }
    }

    /// Offers an existing (template) value as the default.
    pub fn with_current(mut self, current: &Value) -> Self {
        let shown = current.to_inline_string();
        self.label.push_str(&format!(" [current: {shown}]"));
        self.default = Some(shown);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = truncate_description(description);
        self
    }
}

/// Cuts long descriptions to 77 characters plus `...`.
pub fn truncate_description(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= DESCRIPTION_WIDTH {
        return text.to_string();
    }
    let mut out: String = text.chars().take(DESCRIPTION_WIDTH - 3).collect();
    out.push_str("...");
    out
}

pub trait Prompter {
    /// Informational line (hints, skipped fields); never blocks.
    fn note(&mut self, text: &str);

    /// Requests one line; the answer is trimmed. Cancellation is
    /// [`PromptError::Interrupted`].
    fn line(&mut self, prompt: &Prompt) -> Result<String, PromptError>;

    fn is_interactive(&self) -> bool {
        true
    }
}

// ------------------------------ Terminal ---------------------------------- //

/// Reads answers from a line source (stdin) and writes prompts to stderr,
/// keeping stdout free for the rendered manifest. End of input interrupts.
pub struct TerminalPrompter<R> {
    input: R,
}

impl TerminalPrompter<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self { input: io::stdin().lock() }
    }
}

impl<R: BufRead> TerminalPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Prompter for TerminalPrompter<R> {
    fn note(&mut self, text: &str) {
        eprintln!("{}", text.dimmed());
    }

    fn line(&mut self, prompt: &Prompt) -> Result<String, PromptError> {
        let mut err = io::stderr().lock();
        if !prompt.description.is_empty() {
            writeln!(err, "  {}", prompt.description.dimmed())?;
        }
        match prompt.default.as_deref() {
            Some(default) if !default.is_empty() => {
                write!(err, "{} ({}): ", prompt.label.cyan().bold(), default)?
            }
            _ => write!(err, "{}: ", prompt.label.cyan().bold())?,
        }
        err.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(err)?;
            return Err(PromptError::Interrupted);
        }
        Ok(buf.trim().to_string())
    }
}

// --------------------------- Non-interactive ------------------------------ //

/// Answers every request with an empty line, so defaults apply and nothing
/// new is requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn note(&mut self, text: &str) {
        tracing::debug!(note = text, "prompt note (non-interactive)");
    }
    fn line(&mut self, _prompt: &Prompt) -> Result<String, PromptError> {
        Ok(String::new())
    }
    fn is_interactive(&self) -> bool {
        false
    }
}

// ------------------------------ Scripted ---------------------------------- //

/// Replays canned answers and records what was asked. Running out of
/// answers behaves like the user cancelling.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub labels: Vec<String>,
    pub notes: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn note(&mut self, text: &str) {
        self.notes.push(text.to_string());
    }
    fn line(&mut self, prompt: &Prompt) -> Result<String, PromptError> {
        self.labels.push(prompt.label.clone());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer.trim().to_string()),
            None => Err(PromptError::Interrupted),
        }
    }
}
