//! External programs (transcoder, svg renderer) behind one small trait so
//! the pipeline can be driven by test doubles.

use std::{
    ffi::OsString,
    process::{Command, Stdio},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Something that can be run to completion with a list of arguments.
pub trait Process: Send + Sync {
    fn run(&self, args: &[OsString]) -> Result<(), ProcessError>;
}

/// A program found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemProcess {
    program: String,
}

impl SystemProcess {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Process for SystemProcess {
    fn run(&self, args: &[OsString]) -> Result<(), ProcessError> {
        log::debug!("running {} {:?}", self.program, args);

        // output() waits for the child and closes its pipes on every path.
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProcessError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}
