//! Writers for annotated routes. Every writer renders the whole document in memory,
//! stages it next to the destination and renames it into place.

pub mod geometry;
pub mod text;

pub use geometry::{speed_change_indices, write_geojson, write_geojson_with_speed};
pub use text::write_text;

use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render CSV for {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render GeoJSON for {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path, source: io::Error) -> OutputError {
    OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `contents` to a hidden sibling of `path`, then renames it over `path`.
pub(crate) fn commit(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let Some(name) = path.file_name() else {
        return Err(io_error(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"),
        ));
    };
    let staging = path.with_file_name(format!(".{}.tmp", name.to_string_lossy()));

    if let Err(e) = fs::write(&staging, contents) {
        let _ = fs::remove_file(&staging);
        return Err(io_error(path, e));
    }
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(io_error(path, e));
    }

    log::info!("Data saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::{fs, process};

    /// Fresh, empty directory for one test.
    pub fn scratch_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("speed-trace-{}-{}", process::id(), test));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
