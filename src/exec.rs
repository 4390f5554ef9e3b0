//! Launching the downloaded binary

use std::path::Path;

use log::{debug, info};

use crate::error::RunError;

/// Runs a program to completion
///
/// [`ProcessLauncher`] spawns a real child process; tests record the call.
#[allow(async_fn_in_trait)]
pub trait Launcher {
    async fn launch(&self, program: &Path) -> Result<(), RunError>;
}

/// Spawns the program with no arguments, inheriting environment and stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    async fn launch(&self, program: &Path) -> Result<(), RunError> {
        info!("running {}", program.display());

        let status = tokio::process::Command::new(program)
            .status()
            .await
            .map_err(|source| RunError::Launch {
                path: program.to_path_buf(),
                source,
            })?;

        debug!("{} finished with {status}", program.display());
        if status.success() {
            Ok(())
        } else {
            Err(RunError::ExitStatus {
                path: program.to_path_buf(),
                code: status.code(),
            })
        }
    }
}
