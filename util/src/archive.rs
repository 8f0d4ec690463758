//! Struct archiving functionality
//!
//! An [`Archiver`] writes serialisable records as rows of a CSV file in the session's archive
//! directory. It implements [`TelemetrySink`] so the chassis telemetry can be archived directly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;
use chassis_if::tm::{ChassisTm, TelemetrySink};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CannotCreateFile(std::io::Error),

    #[error("Cannot write the record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),

    #[error("The archiver has not been initialised with a file")]
    NotInitialised,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        Self::from_full_path(session.arch_root.join(path))
    }

    /// Create a new archiver writing to the given file, truncating it if it exists.
    pub fn from_full_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = File::create(path).map_err(ArchiveError::CannotCreateFile)?;

        let w = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self { writer: Some(w) })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::WriteError)?;
                w.flush().map_err(ArchiveError::FlushError)
            }
            None => Err(ArchiveError::NotInitialised),
        }
    }
}

impl TelemetrySink for Archiver {
    fn publish(&mut self, tm: &ChassisTm) -> Result<(), Box<dyn std::error::Error>> {
        self.serialise(tm)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_archive_tm() {
        let path = std::env::temp_dir().join(format!("chassis_tm_{}.csv", std::process::id()));

        let mut arch = Archiver::from_full_path(&path).unwrap();
        let mut tm = ChassisTm::default();
        arch.publish(&tm).unwrap();
        tm.time_s = 0.02;
        tm.desaturated = true;
        arch.publish(&tm).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        // Header plus one row per snapshot
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("time_s,pose_x_m,pose_y_m"));
        assert!(lines[2].starts_with("0.02,"));
        assert!(lines[2].ends_with("true"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_uninit_archiver() {
        let mut arch = Archiver::default();
        assert!(matches!(arch.serialise(1u32), Err(ArchiveError::NotInitialised)));
    }
}
