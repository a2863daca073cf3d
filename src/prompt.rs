//! Interactive choice prompts
//!
//! Choices can be answered with any prefix that identifies exactly one of
//! them. Reading the answer goes through [`PromptInput`] so the selection
//! logic stays testable.

use anyhow::Result;
use colored::Colorize;

/// Source of user answers
pub trait PromptInput {
    /// Show `prompt` and return the raw answer line.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Reads answers from the terminal
#[derive(Debug, Default)]
pub struct TerminalInput;

impl PromptInput for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        use dialoguer::{Input, theme::ColorfulTheme};

        let answer = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }
}

/// Shortest prefix of each choice that no other choice starts with.
pub fn aliases(choices: &[&str]) -> Vec<String> {
    choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let unique = choice
                .char_indices()
                .map(|(idx, c)| idx + c.len_utf8())
                .find(|&end| {
                    let prefix = &choice[..end];
                    choices
                        .iter()
                        .enumerate()
                        .all(|(j, other)| i == j || !other.starts_with(prefix))
                });
            match unique {
                Some(end) => choice[..end].to_string(),
                None => choice.to_string(),
            }
        })
        .collect()
}

/// Index of the choice `answer` selects, if any.
pub fn resolve_choice(answer: &str, choices: &[&str]) -> Option<usize> {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return None;
    }

    if let Some(exact) = choices.iter().position(|c| c.to_lowercase() == answer) {
        return Some(exact);
    }

    let mut matching = choices
        .iter()
        .enumerate()
        .filter(|(_, c)| c.to_lowercase().starts_with(&answer));
    match (matching.next(), matching.next()) {
        (Some((idx, _)), None) => Some(idx),
        _ => None,
    }
}

fn render_prompt(message: &str, choices: &[&str], default: usize) -> String {
    let options: Vec<String> = choices
        .iter()
        .zip(aliases(choices))
        .enumerate()
        .map(|(i, (choice, alias))| {
            let rest = &choice[alias.len()..];
            if i == default {
                format!("[{}]{}", alias.to_uppercase(), rest)
            } else {
                format!("[{alias}]{rest}")
            }
        })
        .collect();
    format!("{} ({})", message, options.join("/"))
}

/// Select one of `choices`.
///
/// With `assume_yes` the default is returned without reading input. An empty
/// answer selects the default; an unrecognised one asks again.
pub fn choose(
    message: &str,
    choices: &[&str],
    default: usize,
    assume_yes: bool,
    input: &mut dyn PromptInput,
) -> Result<usize> {
    anyhow::ensure!(
        default < choices.len(),
        "Default choice {} out of range for {} choices",
        default,
        choices.len()
    );

    if assume_yes {
        return Ok(default);
    }

    let prompt = render_prompt(message, choices, default);
    loop {
        let answer = input.read_line(&prompt)?;
        if answer.trim().is_empty() {
            return Ok(default);
        }
        if let Some(idx) = resolve_choice(&answer, choices) {
            return Ok(idx);
        }
        println!(
            "  {} Unrecognised answer '{}', expected one of: {}",
            "!".yellow(),
            answer.trim(),
            choices.join(", ")
        );
    }
}

/// Prompt settings shared by a whole command run
pub struct Prompter {
    assume_yes: bool,
    input: Box<dyn PromptInput>,
}

impl std::fmt::Debug for Prompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompter")
            .field("assume_yes", &self.assume_yes)
            .finish_non_exhaustive()
    }
}

impl Prompter {
    pub fn new(assume_yes: bool, input: Box<dyn PromptInput>) -> Self {
        Self { assume_yes, input }
    }

    /// Prompter that always picks the default
    pub fn non_interactive() -> Self {
        Self::new(true, Box::new(TerminalInput))
    }

    pub fn assume_yes(&self) -> bool {
        self.assume_yes
    }

    pub fn choose(&mut self, message: &str, choices: &[&str], default: usize) -> Result<usize> {
        choose(message, choices, default, self.assume_yes, self.input.as_mut())
    }

    /// Yes/no question defaulting to yes.
    pub fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(self.choose(message, &["yes", "no"], 0)? == 0)
    }
}
