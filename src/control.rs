//! Guest agent daemon control through its SysV init script.

use std::path::Path;

use crate::command::CommandRunner;
use crate::error::CommandError;

fn run_init_script(
    runner: &dyn CommandRunner,
    init_script: &Path,
    action: &str,
) -> Result<(), CommandError> {
    runner.run(&init_script.to_string_lossy(), &[action])?;
    Ok(())
}

/// Start the daemon via `<init script> start`
pub fn start_daemon(runner: &dyn CommandRunner, init_script: &Path) -> Result<(), CommandError> {
    run_init_script(runner, init_script, "start")
}

/// Stop the daemon via `<init script> stop`
pub fn stop_daemon(runner: &dyn CommandRunner, init_script: &Path) -> Result<(), CommandError> {
    run_init_script(runner, init_script, "stop")
}

/// Check if an agent process matching `pattern` is running.
///
/// `pgrep` exits non-zero when nothing matches, which is the "not running"
/// answer rather than an error.
pub fn is_daemon_running(runner: &dyn CommandRunner, pattern: &str) -> bool {
    runner.run("pgrep", &["-f", pattern]).is_ok()
}
