/*!
Confirmation capability for destructive actions.

`Confirm` is what delete commands ask before issuing a delete request.
The CLI wires in `StdinConfirm`; tests substitute a scripted answerer.
Only a literal `y` (any case, surrounding whitespace ignored) confirms.
*/

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

pub trait Confirm {
    /// Show `prompt` and report whether the user agreed.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Interactive prompt on stderr, answer read from stdin.
/// End of input counts as a refusal.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{prompt}")?;
        stderr.flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read confirmation")?;
        Ok(read > 0 && is_affirmative(&line))
    }
}

/// Answers from a fixed script, recording the prompts it was shown.
#[cfg(test)]
pub struct Scripted {
    answers: std::collections::VecDeque<String>,
    pub prompts: Vec<String>,
}

#[cfg(test)]
impl Scripted {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Confirm for Scripted {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.prompts.push(prompt.to_string());
        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected prompt: {prompt}"))?;
        Ok(is_affirmative(&answer))
    }
}
