//! Interactive questions.
//!
//! The command surface talks to the user through [`Prompter`] so that the
//! answer-completion logic can run unattended (`--yes`) or under test.

use crate::error::{Error, Result};
use dialoguer::{Confirm, Input, MultiSelect, Select};

pub trait Prompter {
    fn input(&self, prompt: &str, default: &str) -> Result<String>;

    /// Returns the index of the chosen item.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Returns the indices of the chosen items, in item order.
    fn multi_select(&self, prompt: &str, items: &[String], defaults: &[bool]) -> Result<Vec<usize>>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn input(&self, prompt: &str, default: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .validate_with(|value: &String| -> std::result::Result<(), &str> {
                if value.trim().is_empty() {
                    Err("a value is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map_err(|e| Error::PromptError(e.to_string()))
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))
    }

    fn multi_select(&self, prompt: &str, items: &[String], defaults: &[bool]) -> Result<Vec<usize>> {
        MultiSelect::new()
            .with_prompt(prompt)
            .items(items)
            .defaults(defaults)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))
    }
}

/// Answers every question with its default, for `--yes` runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn input(&self, _prompt: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn select(&self, _prompt: &str, _items: &[String], default: usize) -> Result<usize> {
        Ok(default)
    }

    fn multi_select(&self, _prompt: &str, _items: &[String], defaults: &[bool]) -> Result<Vec<usize>> {
        Ok(defaults.iter().enumerate().filter(|(_, on)| **on).map(|(i, _)| i).collect())
    }

    fn confirm(&self, _prompt: &str, default: bool) -> Result<bool> {
        Ok(default)
    }
}
