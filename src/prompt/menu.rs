use crate::config::RetryPolicy;
use crate::error::{AppError, AppResult};
use crate::prompt::Console;

/// Numbered single-choice menu.
pub struct MenuChooser {
    retry: RetryPolicy,
}

impl MenuChooser {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Returns the chosen option itself, not its index.
    pub fn choose(
        &self,
        console: &mut dyn Console,
        prompt: &str,
        options: &[String],
    ) -> AppResult<String> {
        if options.is_empty() {
            return Err(AppError::InvalidSelection);
        }

        console.say(prompt);
        for (number, option) in options.iter().enumerate() {
            console.say(&format!("{}. {option}", number + 1));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            if !self.retry.allows(attempt) {
                tracing::warn!(prompt, attempts = attempt - 1, "menu selection gave up");
                return Err(AppError::InvalidSelection);
            }

            let input = console.ask("Enter the number of your choice: ")?;
            match parse_choice(&input, options.len()) {
                Ok(index) => return Ok(options[index].clone()),
                Err(message) => console.say(message),
            }
        }
    }
}

fn parse_choice(input: &str, len: usize) -> Result<usize, &'static str> {
    let choice = input
        .trim()
        .parse::<i64>()
        .map_err(|_| "Please enter a valid number.")?;
    if choice >= 1 && (choice as u64) <= len as u64 {
        Ok(choice as usize - 1)
    } else {
        Err("Invalid choice. Please try again.")
    }
}
