use crate::domain::CliError;

/// Checks a text answer; `Err` carries the message shown to the user.
pub type TextValidator<'a> = &'a (dyn Fn(&str) -> Result<(), String> + Sync);

/// Checks the chosen indexes of a multi-select.
pub type SelectionValidator<'a> = &'a (dyn Fn(&[usize]) -> Result<(), String> + Sync);

/// Terminal questions asked while filling in a time entry.
///
/// Implementations keep asking until the validator accepts the answer or the
/// user aborts.
pub trait Prompter: Send + Sync {
    /// Picks one of `items`, returning its index.
    fn select(&self, prompt: &str, items: &[String], default: Option<usize>)
        -> Result<usize, CliError>;

    fn multi_select(
        &self,
        prompt: &str,
        items: &[String],
        selected: &[bool],
        validate: SelectionValidator<'_>,
    ) -> Result<Vec<usize>, CliError>;

    /// Free text with `initial` pre-filled and `suggestions` offered as
    /// completions.
    fn text(
        &self,
        prompt: &str,
        initial: &str,
        suggestions: &[String],
        validate: TextValidator<'_>,
    ) -> Result<String, CliError>;
}

pub fn accept_any_selection(_: &[usize]) -> Result<(), String> {
    Ok(())
}
