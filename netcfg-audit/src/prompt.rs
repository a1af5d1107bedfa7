use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Reminders shown after the first unrecognized answer.
pub const DEFAULT_RETRIES: usize = 2;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no yes/no answer after {0} reminders")]
    RetriesExhausted(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim() {
        "Y" | "y" | "YES" | "yes" => Some(true),
        "N" | "n" | "NO" | "No" | "no" => Some(false),
        _ => None,
    }
}

/// Ask `question` until a recognized answer arrives or the reminders run out.
/// End of input counts as an unrecognized answer.
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
    retries: usize,
) -> Result<bool, PromptError> {
    write!(output, "{question} [Y/n]: ")?;
    output.flush()?;

    let mut reminders = 0;
    loop {
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if let Some(decision) = parse_answer(&answer) {
            return Ok(decision);
        }
        if reminders == retries {
            return Err(PromptError::RetriesExhausted(retries));
        }
        reminders += 1;
        write!(output, "please answer Y or n: ")?;
        output.flush()?;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{confirm, parse_answer, PromptError, DEFAULT_RETRIES};

    fn ask(answers: &str) -> (Result<bool, PromptError>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = confirm("overwrite out.txt?", &mut input, &mut output, DEFAULT_RETRIES);
        (result, String::from_utf8(output).expect("utf-8 prompt"))
    }

    #[test]
    fn recognizes_fixed_answer_set() {
        for yes in ["Y", "y", "YES", "yes"] {
            assert_eq!(parse_answer(yes), Some(true), "{yes}");
        }
        for no in ["N", "n", "NO", "No", "no"] {
            assert_eq!(parse_answer(no), Some(false), "{no}");
        }
        assert_eq!(parse_answer("Yes"), None);
        assert_eq!(parse_answer("sure"), None);
    }

    #[test]
    fn reminds_before_accepting() {
        let (result, prompt) = ask("maybe\nyes\n");
        assert!(result.expect("answer"));
        assert_eq!(prompt, "overwrite out.txt? [Y/n]: please answer Y or n: ");

        let (result, _) = ask("\n\nNo\n");
        assert!(!result.expect("answer"));
    }

    #[test]
    fn gives_up_after_reminders() {
        let (result, prompt) = ask("a\nb\nc\nyes\n");
        assert!(matches!(result, Err(PromptError::RetriesExhausted(2))));
        assert_eq!(prompt.matches("please answer").count(), 2);

        let (result, _) = ask("");
        assert!(matches!(result, Err(PromptError::RetriesExhausted(2))));
    }
}
