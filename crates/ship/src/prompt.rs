//! Operator confirmation prompts.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm};

/// Asks the operator a yes/no question.
pub trait Confirmer: Send + Sync {
    /// Ask `prompt`; `Ok(true)` means the operator agreed.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown (e.g. no terminal).
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Interactive terminal prompt. Defaults to "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Confirmer for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Answers every prompt the same way without asking. Used for `--yes`.
#[derive(Debug, Clone, Copy)]
pub struct AssumeAnswer(pub bool);

impl Confirmer for AssumeAnswer {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(self.0)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays scripted answers and records the prompts it was shown.
    pub(crate) struct ScriptedPrompt {
        answers: Mutex<VecDeque<bool>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedPrompt {
        pub(crate) fn new(answers: &[bool]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                asked: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    impl Confirmer for ScriptedPrompt {
        fn confirm(&self, prompt: &str) -> Result<bool> {
            self.asked.lock().unwrap().push(prompt.to_string());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("unexpected prompt: {prompt}"))
        }
    }
}
