use crate::domain::ports::Prompter;
use crate::utils::error::{Result, ShopperError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Line-editing prompts on the controlling terminal.
pub struct TerminalPrompter {
    editor: DefaultEditor,
}

impl TerminalPrompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_error)?;
        Ok(Self { editor })
    }

    fn read(&mut self, prompt: &str) -> Result<String> {
        self.editor.readline(prompt).map_err(readline_error)
    }
}

fn readline_error(e: ReadlineError) -> ShopperError {
    match e {
        ReadlineError::Interrupted | ReadlineError::Eof => ShopperError::Aborted,
        other => ShopperError::PromptError {
            message: other.to_string(),
        },
    }
}

/// `y`/`yes` and `n`/`no`, case-insensitive. Empty input means no.
pub fn parse_confirmation(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" | "" => Some(false),
        _ => None,
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        loop {
            let prompt = match default {
                Some(d) if !d.is_empty() => format!("{} [{}]: ", question, d),
                _ => format!("{}: ", question),
            };
            let answer = self.read(&prompt)?.trim().to_string();

            if !answer.is_empty() {
                return Ok(answer);
            }
            if let Some(d) = default {
                return Ok(d.to_string());
            }
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            let answer = self.read(&format!("{} [y/N]: ", question))?;
            match parse_confirmation(&answer) {
                Some(choice) => return Ok(choice),
                None => eprintln!("Error: invalid input"),
            }
        }
    }
}
