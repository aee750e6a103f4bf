use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the data directory, both local and in the home directory
pub const DATA_DIR_NAME: &str = ".pomodo";

/// Where the data directory was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataDir {
    /// `.pomodo` in the working directory or one of its ancestors
    Local(PathBuf),
    /// `~/.pomodo`
    Home(PathBuf),
}

impl DataDir {
    pub fn path(&self) -> &Path {
        match self {
            DataDir::Local(path) | DataDir::Home(path) => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            DataDir::Local(path) | DataDir::Home(path) => path,
        }
    }
}

/// The nearest `.pomodo` at or above `start`, else the one under `home`
pub fn locate_data_dir(start: &Path, home: Option<&Path>) -> Result<DataDir> {
    let local = start
        .ancestors()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .find(|candidate| candidate.is_dir());
    if let Some(local) = local {
        return Ok(DataDir::Local(local));
    }

    let home = home.context("Could not determine home directory")?;
    Ok(DataDir::Home(home.join(DATA_DIR_NAME)))
}

/// Resolve the data directory from the working directory and create it if needed
pub fn ensure_pomodo_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let located = locate_data_dir(&current_dir, dirs::home_dir().as_deref())?;
    fs::create_dir_all(located.path())
        .with_context(|| format!("Failed to create directory: {}", located.path().display()))?;
    Ok(located.into_path())
}

/// Create `.pomodo` inside `parent`, refusing to reuse an existing one
pub fn init_local_pomodo(parent: &Path) -> Result<PathBuf> {
    let dir = parent.join(DATA_DIR_NAME);
    if dir.exists() {
        anyhow::bail!("Data directory already exists: {}", dir.display());
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir)
}

/// Path of the log file used while the terminal UI owns the screen
pub fn log_file(dir: &Path) -> PathBuf {
    dir.join("pomodo.log")
}

/// Replace `path` with `bytes` in one step: stage next to it, sync, rename
///
/// A reader sees either the old record or the new one, never a torn write.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("No parent directory for {}", path.display()))?;

    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to stage write in {}", dir.display()))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write staged copy of {}", path.display()))?;
    staged
        .persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Contents of `path`, `None` when there is no such file
pub fn read_if_present(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error).with_context(|| format!("Failed to read {}", path.display())),
    }
}

pub fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
