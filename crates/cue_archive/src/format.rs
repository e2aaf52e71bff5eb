//! Archive contents and the on-disk frame.
//!
//! ```text
//! 0..4    magic "CUEA"
//! 4..6    format, u16 LE
//! 6..8    shot count, u16 LE
//! 8..n    LZ4 block (uncompressed size prepended) of the MessagePack body
//! n..n+32 SHA-256 of bytes 0..n
//! ```
//!
//! The shot count sits in the clear so listings can read it without
//! decompressing; decoding checks it against the body.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use cue_core::engine::{BallPlacement, Table, TableConfig};
use cue_core::ShotRecord;

use crate::error::ArchiveError;

pub const MAGIC: [u8; 4] = *b"CUEA";

/// Newest frame layout this build reads and the one it writes.
pub const FORMAT: u16 = 1;

const HEADER_LEN: usize = 8;
const DIGEST_LEN: usize = 32;

/// A starting table and the solved shots played from it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShotArchive {
    /// Unix milliseconds
    #[serde(default)]
    pub created_at: u64,

    #[serde(default)]
    pub table: TableConfig,

    pub initial_balls: Vec<BallPlacement>,

    #[serde(default)]
    pub shots: Vec<ShotRecord>,
}

impl ShotArchive {
    pub fn new(table: &Table, shots: Vec<ShotRecord>) -> Self {
        Self { created_at: now_millis(), table: *table.config(), initial_balls: table.placements(), shots }
    }

    pub fn to_table(&self) -> Table {
        Table::from_positions(self.table, &self.initial_balls)
    }

    /// Total play time at speed 1.
    pub fn duration(&self) -> f64 {
        self.shots.iter().map(|s| s.duration).sum()
    }

    pub fn validate(&self) -> Result<(), ArchiveError> {
        self.table.validate().map_err(ArchiveError::Table)?;
        self.shots
            .iter()
            .enumerate()
            .try_for_each(|(index, shot)| shot.validate().map_err(|source| ArchiveError::Shot { index, source }))
    }

    pub fn from_json_str(s: &str) -> Result<Self, ArchiveError> {
        let archive: ShotArchive = serde_json::from_str(s)?;
        archive.validate()?;
        Ok(archive)
    }

    pub fn to_json_string(&self) -> Result<String, ArchiveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn created_at_rfc3339(&self) -> Option<String> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.created_at) * 1_000_000)
            .ok()?
            .format(&Rfc3339)
            .ok()
    }
}

/// Clear-text part of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub format: u16,
    pub shots: u16,
}

impl ArchiveHeader {
    /// Check the magic and read the header, without touching the payload.
    pub fn read(bytes: &[u8]) -> Result<Self, ArchiveError> {
        if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
            return Err(ArchiveError::NotAnArchive);
        }
        if bytes.len() < HEADER_LEN {
            return Err(ArchiveError::Truncated { len: bytes.len() });
        }
        Ok(Self {
            format: u16::from_le_bytes([bytes[4], bytes[5]]),
            shots: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format.to_le_bytes());
        out.extend_from_slice(&self.shots.to_le_bytes());
    }
}

/// Frame an archive for disk. Invalid archives are refused.
pub fn encode(archive: &ShotArchive) -> Result<Vec<u8>, ArchiveError> {
    archive.validate()?;
    let shots = u16::try_from(archive.shots.len()).map_err(|_| ArchiveError::TooManyShots(archive.shots.len()))?;

    let body = compress_prepend_size(&rmp_serde::to_vec_named(archive)?);
    let mut out = Vec::with_capacity(HEADER_LEN + body.len() + DIGEST_LEN);
    ArchiveHeader { format: FORMAT, shots }.write(&mut out);
    out.extend_from_slice(&body);

    let digest = Sha256::digest(&out);
    out.extend_from_slice(&digest);
    Ok(out)
}

/// Unframe an archive: magic, digest, format, body, shot count, validation.
pub fn decode(bytes: &[u8]) -> Result<ShotArchive, ArchiveError> {
    let header = ArchiveHeader::read(bytes)?;
    if bytes.len() < HEADER_LEN + DIGEST_LEN {
        return Err(ArchiveError::Truncated { len: bytes.len() });
    }

    let (sealed, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
    if Sha256::digest(sealed).as_slice() != digest {
        return Err(ArchiveError::DigestMismatch);
    }
    if header.format > FORMAT {
        return Err(ArchiveError::NewerFormat { found: header.format, supported: FORMAT });
    }

    let body = decompress_size_prepended(&sealed[HEADER_LEN..])?;
    let archive: ShotArchive = rmp_serde::from_slice(&body)?;
    if archive.shots.len() != usize::from(header.shots) {
        return Err(ArchiveError::ShotCountMismatch { header: header.shots, payload: archive.shots.len() });
    }
    archive.validate()?;
    Ok(archive)
}

pub fn now_millis() -> u64 {
    u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cue_core::engine::{BallNumber, BallRegime, BallTimeline, EventCause, MotionEvent};
    use cue_core::ShotParams;
    use nalgebra::{Vector2, Vector3};

    fn break_shot() -> ShotArchive {
        let table = Table::from_positions(
            TableConfig::default(),
            &[
                BallPlacement::new(BallNumber::CUE, Vector2::new(0.58, 0.5), BallRegime::Stationary),
                BallPlacement::new(BallNumber::EIGHT, Vector2::new(0.58, 1.75), BallRegime::Stationary),
            ],
        );
        let shot = ShotRecord::new(
            ShotParams::new(1.5, 0.0, 0.0, 11.0, 270.0),
            2.5,
            vec![BallTimeline::new(
                BallNumber::CUE,
                vec![
                    MotionEvent::new(0.0, Vector2::new(0.58, 0.5), BallRegime::Sliding)
                        .with_velocity(Vector3::new(0.0, 1.5, 0.0))
                        .with_cause(EventCause::CueStrike),
                    MotionEvent::new(2.4, Vector2::new(0.58, 1.6), BallRegime::Stationary),
                ],
            )],
        );
        ShotArchive::new(&table, vec![shot])
    }

    /// Rewrite the digest after tampering with the sealed part.
    fn reseal(bytes: &mut Vec<u8>) {
        bytes.truncate(bytes.len() - DIGEST_LEN);
        let digest = Sha256::digest(&bytes[..]);
        bytes.extend_from_slice(&digest);
    }

    #[test]
    fn test_frame_layout() {
        let bytes = encode(&break_shot()).unwrap();
        assert_eq!(&bytes[..4], b"CUEA");
        assert_eq!(ArchiveHeader::read(&bytes).unwrap(), ArchiveHeader { format: FORMAT, shots: 1 });

        let restored = decode(&bytes).unwrap();
        assert_eq!(restored, break_shot_with(restored.created_at));
        assert_eq!(restored.to_table().ball_count(), 2);
    }

    fn break_shot_with(created_at: u64) -> ShotArchive {
        ShotArchive { created_at, ..break_shot() }
    }

    #[test]
    fn test_flipped_byte_fails_digest() {
        let mut bytes = encode(&break_shot()).unwrap();
        bytes[HEADER_LEN + 2] ^= 0xff;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::DigestMismatch));
        assert!(err.is_damaged());
    }

    #[test]
    fn test_foreign_and_short_input() {
        assert!(matches!(decode(b"PK\x03\x04 not ours"), Err(ArchiveError::NotAnArchive)));
        assert!(!ArchiveError::NotAnArchive.is_damaged());
        assert!(matches!(decode(b"CUEA\x01\x00\x01\x00"), Err(ArchiveError::Truncated { len: 8 })));
    }

    #[test]
    fn test_newer_format_rejected() {
        let mut bytes = encode(&break_shot()).unwrap();
        bytes[4..6].copy_from_slice(&(FORMAT + 1).to_le_bytes());
        reseal(&mut bytes);
        assert!(matches!(decode(&bytes), Err(ArchiveError::NewerFormat { found, .. }) if found == FORMAT + 1));
    }

    #[test]
    fn test_header_shot_count_checked() {
        let mut bytes = encode(&break_shot()).unwrap();
        bytes[6..8].copy_from_slice(&3u16.to_le_bytes());
        reseal(&mut bytes);
        assert!(matches!(decode(&bytes), Err(ArchiveError::ShotCountMismatch { header: 3, payload: 1 })));
    }

    #[test]
    fn test_invalid_shot_is_not_written() {
        let mut archive = break_shot();
        archive.shots[0].duration = -1.0;
        assert!(matches!(encode(&archive), Err(ArchiveError::Shot { index: 0, .. })));
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{"initial_balls": [{"ball": 0, "position": [0.5, 0.5]}]}"#;
        let archive = ShotArchive::from_json_str(json).unwrap();
        assert_eq!(archive.table, TableConfig::default());
        assert_eq!(archive.initial_balls[0].regime, BallRegime::Stationary);
        assert!(archive.shots.is_empty());
        assert_eq!(archive.created_at_rfc3339().as_deref(), Some("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn test_duration_sums_shots() {
        let mut archive = break_shot();
        archive.shots.push(archive.shots[0].clone());
        assert!((archive.duration() - 5.0).abs() < 1e-12);
    }
}
