//! External command execution.
//!
//! Every tool the installer drives (`chkconfig`, `dracut`, `modinfo`, the init
//! script itself...) goes through [`CommandRunner`], so orchestration code can
//! be exercised against a recording fake.

use std::process::Command;

use log::debug;

use crate::error::CommandError;

/// Runs an external program and captures its output.
pub trait CommandRunner {
    /// Run `program` with `args`, returning stdout on a zero exit status.
    ///
    /// A non-zero exit status yields [`CommandError::Failed`] carrying the
    /// captured stdout and stderr.
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let command = command_line(program, args);
        debug!("Running: {command}");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(CommandError::Failed {
                command,
                status: output.status,
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(stdout)
    }
}

/// Render a command the way it is logged and matched in diagnostics.
pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
