use std::io::{self, BufRead, Write};

use crate::error::{AppError, AppResult};

/// Line-oriented terminal contract. Everything interactive goes through it.
pub trait Console: Send {
    fn say(&mut self, message: &str);

    /// Shows `prompt` and reads one line. `Ok(None)` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Like `read_line`, trimmed. End of input is fatal.
    fn ask(&mut self, prompt: &str) -> AppResult<String> {
        match self.read_line(prompt)? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(AppError::InputClosed),
        }
    }

    fn confirm(&mut self, question: &str) -> AppResult<bool> {
        loop {
            match self.ask(question)?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please enter yes or no."),
            }
        }
    }
}

/// Stdin/stdout console.
pub struct StdConsole;

impl Console for StdConsole {
    fn say(&mut self, message: &str) {
        println!("{message}");
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedConsole;

    #[test]
    fn confirm_accepts_long_and_short_answers() {
        let mut console = ScriptedConsole::new(["YES", "n"]);
        assert!(console.confirm("ok? ").unwrap());
        assert!(!console.confirm("ok? ").unwrap());
    }

    #[test]
    fn confirm_repeats_until_answered() {
        let mut console = ScriptedConsole::new(["maybe", "", "y"]);
        assert!(console.confirm("ok? ").unwrap());
        assert_eq!(console.count_said("Please enter yes or no."), 2);
    }

    #[test]
    fn end_of_input_fails_fast() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        assert!(matches!(console.ask("name? "), Err(AppError::InputClosed)));
        assert!(matches!(console.confirm("ok? "), Err(AppError::InputClosed)));
    }
}
