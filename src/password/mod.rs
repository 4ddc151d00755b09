//! Password acquisition.
//!
//! The source of the password is decided once at startup and injected
//! as a `PasswordInput`:
//! - `TerminalInput` shows a prompt and reads with echo disabled.
//! - `PipedInput` consumes a whole stream (e.g. redirected stdin) as the
//!   password, without a prompt.  It may carry a terminal fallback that
//!   `unlock` uses when the stream turns out to be empty.
//!
//! `unlock` makes a single attempt.  `init` runs the confirm-and-retry
//! protocol used when a new vault is created.

use std::io::{self, IsTerminal, Read};

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};
use crate::output;

/// Total attempts allowed when choosing a new password.
pub const PASSWORD_ATTEMPTS: usize = 3;

/// A source of password bytes.
pub trait PasswordInput {
    /// Read one password.  `prompt` is shown only by interactive sources.
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>>;

    /// Whether a human is answering.  Non-interactive sources cannot be
    /// asked twice, so they skip confirmation.
    fn is_interactive(&self) -> bool {
        true
    }

    /// Source to ask instead when this one yields an empty unlock password.
    fn fallback(&mut self) -> Option<&mut dyn PasswordInput> {
        None
    }
}

/// Masked prompt on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl PasswordInput for TerminalInput {
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        let pw = dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| VaultError::PromptFailed(e.to_string()))?;
        Ok(Zeroizing::new(pw.into_bytes()))
    }
}

/// The entire contents of a stream, taken verbatim as the password.
pub struct PipedInput<R> {
    reader: R,
    fallback: Option<Box<dyn PasswordInput>>,
}

impl<R: Read> PipedInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            fallback: None,
        }
    }

    /// Like `new`, but an empty stream on unlock defers to `fallback`.
    pub fn with_fallback(reader: R, fallback: Box<dyn PasswordInput>) -> Self {
        Self {
            reader,
            fallback: Some(fallback),
        }
    }
}

impl<R: Read> PasswordInput for PipedInput<R> {
    fn read_password(&mut self, _prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn fallback(&mut self) -> Option<&mut dyn PasswordInput> {
        self.fallback
            .as_mut()
            .map(|f| f.as_mut() as &mut dyn PasswordInput)
    }
}

/// Pick the input variant for this process: piped when stdin is not a
/// terminal, masked prompt otherwise.  An empty pipe falls back to the
/// prompt when unlocking.
pub fn detect_input() -> Box<dyn PasswordInput> {
    if io::stdin().is_terminal() {
        Box::new(TerminalInput)
    } else {
        tracing::debug!("stdin is not a terminal, reading password from pipe");
        Box::new(PipedInput::with_fallback(io::stdin(), Box::new(TerminalInput)))
    }
}

/// Obtain the password for an existing vault.  No retry: a wrong
/// password surfaces later as `WrongPassword`.
pub fn unlock(input: &mut dyn PasswordInput) -> Result<Zeroizing<Vec<u8>>> {
    const PROMPT: &str = "Enter datafile password";

    let password = input.read_password(PROMPT)?;
    if password.is_empty() {
        if let Some(fallback) = input.fallback() {
            tracing::debug!("piped password is empty, asking on the terminal");
            return fallback.read_password(PROMPT);
        }
    }
    Ok(password)
}

/// Choose the password for a new vault.
///
/// Each attempt asks for the password and, on interactive input, a
/// confirmation.  An empty password or a mismatch costs one attempt.
/// After `PASSWORD_ATTEMPTS` failures the result is `WrongPassword`.
pub fn init(input: &mut dyn PasswordInput) -> Result<Zeroizing<Vec<u8>>> {
    for attempt in 1..=PASSWORD_ATTEMPTS {
        let password = input.read_password("New datafile password")?;
        let retry = attempt < PASSWORD_ATTEMPTS;

        if password.is_empty() {
            complain("Password can't be empty", retry);
            continue;
        }

        if !input.is_interactive() {
            return Ok(password);
        }

        let confirmation = input.read_password("Confirm datafile password")?;
        if bool::from(password.as_slice().ct_eq(confirmation.as_slice())) {
            return Ok(password);
        }

        complain("Passwords not the same", retry);
    }

    tracing::debug!(attempts = PASSWORD_ATTEMPTS, "no confirmed password, giving up");
    Err(VaultError::WrongPassword)
}

fn complain(msg: &str, retry: bool) {
    if retry {
        output::error(&format!("{msg}, retry"));
    } else {
        output::error(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    struct Scripted(VecDeque<&'static str>);

    impl PasswordInput for Scripted {
        fn read_password(&mut self, _prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
            let next = self.0.pop_front().unwrap_or_default();
            Ok(Zeroizing::new(next.as_bytes().to_vec()))
        }
    }

    fn scripted(answers: &[&'static str]) -> Scripted {
        Scripted(answers.iter().copied().collect())
    }

    #[test]
    fn init_accepts_matching_pair() {
        let mut input = scripted(&["hunter22", "hunter22"]);
        assert_eq!(init(&mut input).unwrap().as_slice(), b"hunter22");
    }

    #[test]
    fn init_retries_after_mismatch() {
        let mut input = scripted(&["one", "two", "three", "three"]);
        assert_eq!(init(&mut input).unwrap().as_slice(), b"three");
    }

    #[test]
    fn empty_password_costs_an_attempt() {
        let mut input = scripted(&["", "", "x", "y"]);
        assert!(matches!(init(&mut input), Err(VaultError::WrongPassword)));
    }

    #[test]
    fn init_gives_up_after_three_mismatches() {
        let mut input = scripted(&["a", "b", "c", "d", "e", "f", "g", "g"]);
        assert!(matches!(init(&mut input), Err(VaultError::WrongPassword)));
        // The fourth pair was never asked for.
        assert_eq!(input.0.len(), 2);
    }

    #[test]
    fn piped_input_reads_whole_stream() {
        let mut input = PipedInput::new(Cursor::new(b"line one\nline two\n".to_vec()));
        assert!(!input.is_interactive());
        assert_eq!(
            unlock(&mut input).unwrap().as_slice(),
            b"line one\nline two\n"
        );
    }

    #[test]
    fn piped_init_skips_confirmation() {
        let mut input = PipedInput::new(Cursor::new(b"correcthorse".to_vec()));
        assert_eq!(init(&mut input).unwrap().as_slice(), b"correcthorse");
    }

    #[test]
    fn empty_pipe_cannot_init() {
        let mut input = PipedInput::new(Cursor::new(Vec::new()));
        assert!(matches!(init(&mut input), Err(VaultError::WrongPassword)));
    }

    #[test]
    fn empty_pipe_unlock_asks_fallback() {
        let mut input =
            PipedInput::with_fallback(Cursor::new(Vec::new()), Box::new(scripted(&["typed"])));
        assert_eq!(unlock(&mut input).unwrap().as_slice(), b"typed");
    }

    #[test]
    fn nonempty_pipe_ignores_fallback() {
        let mut input = PipedInput::with_fallback(
            Cursor::new(b"piped".to_vec()),
            Box::new(scripted(&["typed"])),
        );
        assert_eq!(unlock(&mut input).unwrap().as_slice(), b"piped");
    }

    #[test]
    fn empty_pipe_without_fallback_stays_empty() {
        let mut input = PipedInput::new(Cursor::new(Vec::new()));
        assert!(unlock(&mut input).unwrap().is_empty());
    }

    #[test]
    fn init_never_uses_fallback() {
        let mut input =
            PipedInput::with_fallback(Cursor::new(Vec::new()), Box::new(scripted(&["typed"; 6])));
        assert!(matches!(init(&mut input), Err(VaultError::WrongPassword)));
    }
}
