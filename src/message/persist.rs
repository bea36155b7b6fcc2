//! Raw-message backup to disk.

use std::path::{Path, PathBuf};

use log::debug;
use mail_parser::Message;

use crate::error::{Error, Result};

/// Write the message's raw wire form to `folder/filename`, overwriting any
/// existing file; returns the written path.
///
/// When no filename is given it is derived from the message date via
/// [`default_filename`]. Two messages with identical timestamps map to the
/// same default name and silently overwrite each other; collision handling
/// is out of scope.
pub fn save_raw(msg: &Message<'_>, folder: &Path, filename: Option<&str>) -> Result<PathBuf> {
    let name = match filename {
        Some(name) => name.to_string(),
        None => default_filename(msg)?,
    };
    let path = folder.join(name);
    std::fs::write(&path, msg.raw_message.as_ref())?;
    debug!("saved raw message to {}", path.display());
    Ok(path)
}

/// Derive the backup filename `_out_YYYYMMDD_HH-MM-SS.txt` from the
/// message's Date header (wall-clock time as written, offset ignored).
pub fn default_filename(msg: &Message<'_>) -> Result<String> {
    let date = msg
        .date()
        .ok_or_else(|| Error::MissingHeader("date".to_string()))?;
    Ok(format!(
        "_out_{:04}{:02}{:02}_{:02}-{:02}-{:02}.txt",
        date.year, date.month, date.day, date.hour, date.minute, date.second
    ))
}
