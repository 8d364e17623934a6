use std::fs::{self, File};
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use compat::{current_process_id, ProcessId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error(transparent)]
    IOError(#[from] io::Error),
    #[error("not a process id: {0:?}")]
    Parse(String),
}

/// A file holding this process' id. It is removed when dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    pid: ProcessId,
}

impl PidFile {
    /// Writes the current process id followed by a newline to `path`,
    /// replacing whatever the file held.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<PidFile, PidFileError> {
        let path = path.as_ref();
        let pid = current_process_id();
        let mut fp = File::create(path)?;
        if let Err(e) = writeln!(fp, "{}", pid).and_then(|_| fp.sync_all()) {
            // leave device nodes such as /dev/full alone
            if fp.metadata().map(|m| m.is_file()).unwrap_or(false) {
                let _ = fs::remove_file(path);
            }
            return Err(e.into());
        }
        Ok(PidFile {
            path: path.to_path_buf(),
            pid,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Reads the process id stored in a pid file.
pub fn read_pidfile<P: AsRef<Path>>(path: P) -> Result<ProcessId, PidFileError> {
    let content = fs::read_to_string(path)?;
    let trimmed = content.trim();
    trimmed
        .parse()
        .map_err(|_| PidFileError::Parse(trimmed.to_owned()))
}
