use dialoguer::{theme::ColorfulTheme, Completion, Input, MultiSelect, Select};

use crate::domain::{
    ports::{Prompter, SelectionValidator, TextValidator},
    CliError,
};

/// Prompts on the terminal with dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

/// Completes the typed text with the first suggestion starting with it.
struct Suggestions<'a>(&'a [String]);

impl Completion for Suggestions<'_> {
    fn get(&self, input: &str) -> Option<String> {
        let typed = input.to_lowercase();
        self.0
            .iter()
            .find(|s| s.to_lowercase().starts_with(&typed))
            .cloned()
    }
}

fn prompt_error(e: dialoguer::Error) -> CliError {
    CliError::Prompt(e.to_string())
}

impl Prompter for TerminalPrompter {
    fn select(
        &self,
        prompt: &str,
        items: &[String],
        default: Option<usize>,
    ) -> Result<usize, CliError> {
        let theme = ColorfulTheme::default();
        Select::with_theme(&theme)
            .with_prompt(prompt)
            .items(items)
            .default(default.unwrap_or(0))
            .interact()
            .map_err(prompt_error)
    }

    fn multi_select(
        &self,
        prompt: &str,
        items: &[String],
        selected: &[bool],
        validate: SelectionValidator<'_>,
    ) -> Result<Vec<usize>, CliError> {
        let theme = ColorfulTheme::default();
        let mut defaults = selected.to_vec();
        loop {
            let chosen = MultiSelect::with_theme(&theme)
                .with_prompt(prompt)
                .items(items)
                .defaults(&defaults)
                .interact()
                .map_err(prompt_error)?;
            match validate(&chosen) {
                Ok(()) => return Ok(chosen),
                Err(message) => {
                    eprintln!("{}", message);
                    defaults = (0..items.len()).map(|i| chosen.contains(&i)).collect();
                }
            }
        }
    }

    fn text(
        &self,
        prompt: &str,
        initial: &str,
        suggestions: &[String],
        validate: TextValidator<'_>,
    ) -> Result<String, CliError> {
        let theme = ColorfulTheme::default();
        let completion = Suggestions(suggestions);
        Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .completion_with(&completion)
            .validate_with(|input: &String| validate(input))
            .interact_text()
            .map_err(prompt_error)
    }
}
