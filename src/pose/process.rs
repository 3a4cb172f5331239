use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command as StdCommand, Stdio},
};

use super::error::PoseError;
use crate::config::PoseConfig;

/// A resolved pose-landmark extractor ready to be spawned per video.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PoseCommand {
    pub fn new(program: PathBuf, config: &PoseConfig) -> Self {
        Self {
            program,
            args: config.args.clone(),
        }
    }

    pub fn render_args(&self, video: &Path, sample_ms: u32) -> Vec<String> {
        let video = video.to_string_lossy();
        let sample_ms = sample_ms.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{video}", &video)
                    .replace("{sample_ms}", &sample_ms)
            })
            .collect()
    }

    pub fn spawn(&self, video: &Path, sample_ms: u32) -> Result<ChildGuard, PoseError> {
        let args = self.render_args(video, sample_ms);
        log::info!(
            "Executing pose command: {} {}",
            self.program.display(),
            args.join(" ")
        );

        let child = StdCommand::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| PoseError::Spawn {
                command: self.program.display().to_string(),
                source,
            })?;

        log::debug!("Pose command spawned (PID: {})", child.id());
        Ok(ChildGuard { child: Some(child) })
    }
}

/// Owns the pose child process; kills and reaps it when dropped.
#[derive(Debug)]
pub struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.as_mut().and_then(|c| c.stdout.take())
    }

    /// Waits for a clean exit after the output has been drained.
    pub fn wait(&mut self) -> Result<(), PoseError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(PoseError::Exit(status.to_string()))
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                log::warn!("Stopping pose command (PID: {}) before it finished", child.id());
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}
