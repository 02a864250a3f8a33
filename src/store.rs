//! Persistence of the [`AlarmConfig`].
//!
//! The configuration is stored as a small JSON document:
//!
//! ```json
//! {"version":1,"enabled":true,"hour":7,"minute":30,"week_days":62}
//! ```
//!
//! `week_days` is a 7-bit mask with bit 0 for Sunday. Missing keys decode as
//! `false`/`0`, so documents written by older firmware still load.

use serde::{Deserialize, Serialize};

use crate::config::{AlarmConfig, WeekDays};

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// Room needed for an encoded document, with margin.
pub const MAX_DOCUMENT_LEN: usize = 96;

/// Error loading the persisted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigLoadError {
    /// Nothing has been stored yet
    NotFound,
    /// The stored document could not be decoded
    Corrupt,
    /// The storage medium could not be read
    Storage,
}

/// Error writing the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceWriteError {
    /// The document did not fit the output buffer
    Encode,
    /// The storage medium rejected the write
    Storage,
}

/// Persistent storage for the alarm configuration.
pub trait ConfigStore {
    /// Loads the stored configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigLoadError::NotFound`] if nothing was stored yet, otherwise
    /// [`ConfigLoadError::Corrupt`] or [`ConfigLoadError::Storage`].
    fn load(&mut self) -> Result<AlarmConfig, ConfigLoadError>;

    /// Replaces the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceWriteError`] if the document could not be written.
    fn save(&mut self, config: &AlarmConfig) -> Result<(), PersistenceWriteError>;
}

/// On-storage layout of an [`AlarmConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredAlarm {
    pub version: u32,
    pub enabled: bool,
    pub hour: u8,
    pub minute: u8,
    pub week_days: u8,
}

impl From<&AlarmConfig> for StoredAlarm {
    fn from(config: &AlarmConfig) -> Self {
        Self {
            version: SCHEMA_VERSION,
            enabled: config.enabled,
            hour: config.hour,
            minute: config.minute,
            week_days: config.week_days.mask(),
        }
    }
}

impl From<StoredAlarm> for AlarmConfig {
    fn from(stored: StoredAlarm) -> Self {
        AlarmConfig {
            enabled: stored.enabled,
            hour: stored.hour,
            minute: stored.minute,
            week_days: WeekDays::from_mask(stored.week_days),
        }
    }
}

/// Encodes `config` into `buf`, returning the number of bytes written.
///
/// # Errors
///
/// [`PersistenceWriteError::Encode`] if `buf` is too small.
pub fn encode(config: &AlarmConfig, buf: &mut [u8]) -> Result<usize, PersistenceWriteError> {
    serde_json_core::to_slice(&StoredAlarm::from(config), buf)
        .map_err(|_| PersistenceWriteError::Encode)
}

/// Decodes a stored document.
///
/// # Errors
///
/// [`ConfigLoadError::Corrupt`] if `data` is not a valid document.
pub fn decode(data: &[u8]) -> Result<AlarmConfig, ConfigLoadError> {
    let (stored, _) = serde_json_core::from_slice::<StoredAlarm>(data).map_err(|_e| {
        error!("alarm config: failed to decode {} bytes", data.len());
        ConfigLoadError::Corrupt
    })?;
    if stored.version != SCHEMA_VERSION {
        warn!(
            "alarm config: unexpected schema version {}, loading anyway",
            stored.version
        );
    }
    Ok(stored.into())
}

/// RAM-backed store holding the encoded document.
///
/// Mainly useful for tests and as the reference for flash-backed stores, which
/// only have to move the same bytes to and from their medium.
#[derive(Debug, Default)]
pub struct MemoryStore<const N: usize = MAX_DOCUMENT_LEN> {
    document: heapless::Vec<u8, N>,
}

impl<const N: usize> MemoryStore<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            document: heapless::Vec::new(),
        }
    }

    /// Creates a store that already holds `document`, which is kept verbatim.
    #[must_use]
    pub fn with_document(document: &[u8]) -> Self {
        // Oversized documents are truncated, which reads back as corrupt.
        let len = document.len().min(N);
        Self {
            document: heapless::Vec::from_slice(&document[..len]).unwrap_or_default(),
        }
    }

    /// The currently stored bytes, empty if nothing was saved.
    #[must_use]
    pub fn document(&self) -> &[u8] {
        &self.document
    }
}

impl<const N: usize> ConfigStore for MemoryStore<N> {
    fn load(&mut self) -> Result<AlarmConfig, ConfigLoadError> {
        if self.document.is_empty() {
            return Err(ConfigLoadError::NotFound);
        }
        decode(&self.document)
    }

    fn save(&mut self, config: &AlarmConfig) -> Result<(), PersistenceWriteError> {
        let mut buf = [0u8; N];
        let len = encode(config, &mut buf)?;
        self.document.clear();
        self.document
            .extend_from_slice(&buf[..len])
            .map_err(|_| PersistenceWriteError::Storage)?;
        debug!("alarm config: stored {} bytes", len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_save_then_load_round_trip() {
        let mut store = MemoryStore::<MAX_DOCUMENT_LEN>::new();
        let config = AlarmConfig::new(
            true,
            6,
            45,
            WeekDays::NONE.with(Weekday::Mon).with(Weekday::Fri),
        );
        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_empty_store_is_not_found() {
        let mut store = MemoryStore::<MAX_DOCUMENT_LEN>::new();
        assert_eq!(store.load(), Err(ConfigLoadError::NotFound));
    }

    #[test]
    fn test_document_layout() {
        let config = AlarmConfig::new(true, 7, 30, WeekDays::from_mask(0b011_1110));
        let mut buf = [0u8; MAX_DOCUMENT_LEN];
        let len = encode(&config, &mut buf).unwrap();
        assert_eq!(
            &buf[..len],
            br#"{"version":1,"enabled":true,"hour":7,"minute":30,"week_days":62}"#
        );
    }

    #[test]
    fn test_decode_missing_keys_default() {
        let config = decode(br#"{"hour":9}"#).unwrap();
        assert_eq!(config, AlarmConfig::new(false, 9, 0, WeekDays::NONE));
    }

    #[test]
    fn test_decode_other_version_still_loads() {
        let config =
            decode(br#"{"version":2,"enabled":false,"hour":1,"minute":2,"week_days":1}"#).unwrap();
        assert_eq!(
            config,
            AlarmConfig::new(false, 1, 2, WeekDays::NONE.with(Weekday::Sun))
        );
    }

    #[test]
    fn test_corrupt_document() {
        let mut store = MemoryStore::<MAX_DOCUMENT_LEN>::with_document(b"{\"hour\":");
        assert_eq!(store.load(), Err(ConfigLoadError::Corrupt));
        let mut store = MemoryStore::<MAX_DOCUMENT_LEN>::with_document(b"not json");
        assert_eq!(store.load(), Err(ConfigLoadError::Corrupt));
    }

    #[test]
    fn test_oversized_document_is_truncated() {
        let doc = br#"{"version":1,"enabled":true}"#;
        let store = MemoryStore::<28>::with_document(doc);
        assert_eq!(store.document(), &doc[..]);

        let mut store = MemoryStore::<16>::with_document(doc);
        assert_eq!(store.document(), &doc[..16]);
        assert_eq!(store.load(), Err(ConfigLoadError::Corrupt));
    }

    #[test]
    fn test_encode_into_small_buffer_fails() {
        let mut buf = [0u8; 8];
        assert_eq!(
            encode(&AlarmConfig::default(), &mut buf),
            Err(PersistenceWriteError::Encode)
        );
    }

    #[test]
    fn test_small_store_rejects_save() {
        let mut store = MemoryStore::<16>::new();
        assert_eq!(
            store.save(&AlarmConfig::default()),
            Err(PersistenceWriteError::Encode)
        );
        assert!(store.document().is_empty());
    }
}
