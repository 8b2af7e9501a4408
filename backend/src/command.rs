use homerow::DriverError;
use std::{
    path::PathBuf,
    process::{Command, Stdio},
};

/// An external program found on `PATH`.
#[derive(Debug, Clone)]
pub struct Tool {
    name: &'static str,
    path: PathBuf,
}

impl Tool {
    pub fn locate(name: &'static str) -> Option<Self> {
        which::which(name).ok().map(|path| Self { name, path })
    }

    /// Runs the tool and returns its stdout.
    pub fn output(&self, args: &[&str]) -> Result<String, DriverError> {
        let output = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| DriverError::Io {
                operation: self.name,
                source,
            })?;

        if !output.status.success() {
            return Err(DriverError::Command {
                program: self.name.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs the tool for its side effect.
    pub fn run(&self, args: &[&str]) -> Result<(), DriverError> {
        self.output(args).map(drop)
    }
}
