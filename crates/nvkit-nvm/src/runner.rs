use async_trait::async_trait;
use log::{debug, trace};
use tokio::process::Command;

use nvkit_backend::{CommandRunner, ToolInvocation, ToolOutput};
use nvkit_platform::HideWindow;

/// Spawns the invocation as a real subprocess and waits for it to finish,
/// capturing both output streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutput> {
        debug!(
            "Spawning {} with {} args",
            invocation.program,
            invocation.args.len()
        );

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        for (key, value) in &invocation.envs {
            command.env(key, value);
        }
        command.hide_window();

        let output = command.output().await?;

        debug!("Command exit status: {:?}", output.status);

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        trace!("stdout: {stdout}");
        if !stderr.is_empty() {
            trace!("stderr: {stderr}");
        }

        Ok(ToolOutput {
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_of_a_real_process() {
        let invocation = ToolInvocation::new("sh").args(["-c", "printf 'v18.17.0'"]);

        let output = ProcessRunner
            .run(&invocation)
            .await
            .expect("sh should be spawnable");

        assert!(output.success);
        assert_eq!(output.stdout, "v18.17.0");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_reported_as_failure_not_error() {
        let invocation = ToolInvocation::new("sh").args(["-c", "echo broken >&2; exit 3"]);

        let output = ProcessRunner
            .run(&invocation)
            .await
            .expect("sh should be spawnable");

        assert!(!output.success);
        assert!(output.stderr.contains("broken"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let invocation = ToolInvocation::new("definitely-not-a-real-binary-nvkit");

        let result = ProcessRunner.run(&invocation).await;

        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn extra_envs_reach_the_child() {
        let invocation = ToolInvocation::new("sh")
            .args(["-c", "printf '%s' \"$NVKIT_TEST_MARKER\""])
            .env("NVKIT_TEST_MARKER", "present");

        let output = ProcessRunner
            .run(&invocation)
            .await
            .expect("sh should be spawnable");

        assert_eq!(output.stdout, "present");
    }
}
