//! Filesystem utilities.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories as needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }

    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}
