//! Uninstall confirmation.

use std::io::{self, BufRead, IsTerminal, Write};

use inquire::Confirm;

const QUESTION: &str = "Are you sure you want to uninstall guest tools?";

/// Ask the operator to confirm removal. Declines by default.
///
/// An interactive terminal gets an `inquire` prompt; anything else is read
/// line by line from stdin.
pub fn confirm_uninstall() -> bool {
    if io::stdin().is_terminal() {
        return Confirm::new(QUESTION)
            .with_default(false)
            .with_help_message("Stops the guest agent and deletes the installation")
            .prompt()
            .unwrap_or(false);
    }

    let stdin = io::stdin();
    confirm_from(stdin.lock(), io::stderr())
}

/// `y`/`Y` confirms; `n`/`N`, an empty line or end of input declines. Any
/// other answer repeats the question.
pub fn confirm_from<R: BufRead, W: Write>(mut input: R, mut output: W) -> bool {
    loop {
        let _ = write!(output, "{QUESTION} (Y/[N]): ");
        let _ = output.flush();

        let mut answer = String::new();
        match input.read_line(&mut answer) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }

        match answer.trim() {
            "y" | "Y" => return true,
            "" | "n" | "N" => return false,
            _ => {
                let _ = writeln!(output, "Please answer Y or N.");
            }
        }
    }
}
