use dialoguer::{Confirm, Input};

use crate::error::Result;

/// Operator interaction during a release
pub trait Prompter {
    /// Ask a yes/no question
    fn confirm(&self, message: &str) -> Result<bool>;

    /// Block until the operator acknowledges `message`
    fn pause(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> Result<bool> {
        let confirmed = Confirm::new()
            .with_prompt(message)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }

    fn pause(&self, message: &str) -> Result<()> {
        let _: String = Input::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()?;
        Ok(())
    }
}
