//! Export module
//!
//! Renders hub definition files from the studio graph and writes them to disk.

pub mod definition;
pub mod naming;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use definition::{render, render_all, render_routes, render_with_track_name, DefinitionFile};

/// Errors that can occur while writing definitions.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to overwrite existing file '{0}'")]
    AlreadyExists(PathBuf),
}

/// Writes each definition into `dir`, creating it if needed.
///
/// Existing files are left untouched and reported as an error unless
/// `overwrite` is set. Returns the written paths in order.
pub fn write_definitions(
    files: &[DefinitionFile],
    dir: &Path,
    overwrite: bool,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    if !overwrite {
        if let Some(existing) = files
            .iter()
            .map(|f| dir.join(&f.filename))
            .find(|p| p.exists())
        {
            return Err(ExportError::AlreadyExists(existing));
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.filename);
        std::fs::write(&path, &file.text).map_err(|source| ExportError::WriteFile {
            path: path.clone(),
            source,
        })?;
        log::info!("wrote {} ({} -> {})", path.display(), file.instrument, file.hub_port_code);
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{HubPortCode, InstrumentId};

    fn file(name: &str, text: &str) -> DefinitionFile {
        DefinitionFile {
            instrument: InstrumentId::from("inst-2"),
            hub_port_code: HubPortCode::A,
            filename: name.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_write_definitions_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("defs");
        let written = write_definitions(&[file("Juno.txt", "VERSION 1\n")], &dir, false).unwrap();
        assert_eq!(written, vec![dir.join("Juno.txt")]);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "VERSION 1\n");
    }

    #[test]
    fn test_write_definitions_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Juno.txt"), "old").unwrap();

        let files = [file("Moog.txt", "new"), file("Juno.txt", "new")];
        let err = write_definitions(&files, tmp.path(), false).unwrap_err();
        assert!(matches!(err, ExportError::AlreadyExists(_)));
        // Nothing written when refusing.
        assert!(!tmp.path().join("Moog.txt").exists());
        assert_eq!(std::fs::read_to_string(tmp.path().join("Juno.txt")).unwrap(), "old");

        write_definitions(&files, tmp.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path().join("Juno.txt")).unwrap(), "new");
    }
}
