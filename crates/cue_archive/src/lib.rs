//! # cue_archive - Shot archive files
//!
//! Stores a starting table and its solved shots so they can be replayed
//! later without the solver. Two forms are read:
//! - `.cuearchive`: framed, LZ4-compressed MessagePack with a SHA-256 seal
//! - `.json`: the same contents as plain JSON, for hand-written shot lists

pub mod error;
pub mod format;

pub use error::ArchiveError;
pub use format::{decode, encode, ArchiveHeader, ShotArchive, FORMAT};

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub const ARCHIVE_EXTENSION: &str = "cuearchive";

/// Write the framed archive through a sibling temp file so a crash never
/// leaves a half-written archive at `path`.
pub fn save_to_path(path: &Path, archive: &ShotArchive) -> Result<(), ArchiveError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let bytes = encode(archive)?;
    let partial = path.with_extension(format!("{}.partial", ARCHIVE_EXTENSION));
    let mut file = File::create(&partial)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&partial, path)?;

    log::debug!("wrote {} shots to {:?} ({} bytes)", archive.shots.len(), path, bytes.len());
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<ShotArchive, ArchiveError> {
    if !path.exists() {
        return Err(ArchiveError::NotFound(path.to_path_buf()));
    }
    let archive = decode(&fs::read(path)?)?;
    log::debug!("read {} shots from {:?}", archive.shots.len(), path);
    Ok(archive)
}

/// `.json` files are read as plain JSON, anything else as a framed archive.
pub fn load_any(path: &Path) -> Result<ShotArchive, ArchiveError> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return load_from_path(path);
    }
    if !path.exists() {
        return Err(ArchiveError::NotFound(path.to_path_buf()));
    }
    ShotArchive::from_json_str(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cue_core::engine::{BallNumber, BallPlacement, BallRegime, Table, TableConfig};
    use nalgebra::Vector2;
    use tempfile::TempDir;

    fn archive() -> ShotArchive {
        let table = Table::from_positions(
            TableConfig::default(),
            &[BallPlacement::new(BallNumber::CUE, Vector2::new(0.5, 0.5), BallRegime::Stationary)],
        );
        ShotArchive::new(&table, Vec::new())
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions").join("evening.cuearchive");

        let original = archive();
        save_to_path(&path, &original).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("cuearchive.partial").exists());
        assert_eq!(load_from_path(&path).unwrap(), original);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_any(&dir.path().join("nope.cuearchive")).unwrap_err();
        assert!(matches!(err, ArchiveError::NotFound(_)));
        assert!(matches!(load_any(&dir.path().join("nope.json")), Err(ArchiveError::NotFound(_))));
    }

    #[test]
    fn test_load_any_by_extension() {
        let dir = TempDir::new().unwrap();
        let original = archive();

        let json = dir.path().join("shots.json");
        fs::write(&json, original.to_json_string().unwrap()).unwrap();
        assert_eq!(load_any(&json).unwrap(), original);

        let framed = dir.path().join("shots.cuearchive");
        save_to_path(&framed, &original).unwrap();
        assert_eq!(load_any(&framed).unwrap(), original);

        // A JSON file under the archive extension is not silently accepted.
        fs::write(&framed, original.to_json_string().unwrap()).unwrap();
        assert!(matches!(load_any(&framed), Err(ArchiveError::NotAnArchive)));
    }
}
