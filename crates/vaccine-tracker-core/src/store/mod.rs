//! Storage layer for the vaccine tracker.
//!
//! The whole record collection lives as one JSON list under a single key.
//! Every save rewrites it in full; there is no locking and the last
//! writer wins.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use schema::*;
pub use sqlite::SqliteStore;

use chrono::FixedOffset;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::models::VaccinationRecord;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value persistence, the shape of a mobile platform's local storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing what was there.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}

/// Reads and writes the record collection under its storage key.
pub struct RecordStore<S> {
    kv: S,
    key: String,
    utc_offset: FixedOffset,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Wrap a key-value store using the default records key.
    pub fn new(kv: S) -> Self {
        Self::with_config(kv, &StoreConfig::default())
    }

    pub fn with_config(kv: S, config: &StoreConfig) -> Self {
        Self {
            kv,
            key: config.records_key.clone(),
            utc_offset: config.utc_offset,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Access the underlying key-value store.
    pub fn inner(&self) -> &S {
        &self.kv
    }

    /// Load the full collection. A missing key is an empty collection.
    pub fn load(&self) -> StoreResult<Vec<VaccinationRecord>> {
        let records = match self.kv.get(&self.key)? {
            Some(json) => VaccinationRecord::list_from_json(&json, &self.utc_offset)?,
            None => Vec::new(),
        };
        tracing::debug!(key = %self.key, count = records.len(), "Loaded vaccination records");
        Ok(records)
    }

    /// Replace the stored collection.
    pub fn save(&self, records: &[VaccinationRecord]) -> StoreResult<()> {
        let json = serde_json::to_string(records)?;
        self.kv.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = records.len(), "Saved vaccination records");
        Ok(())
    }

    /// Find a record by identifier.
    pub fn find(&self, id: &str) -> StoreResult<Option<VaccinationRecord>> {
        Ok(self.load()?.into_iter().find(|r| r.id == id))
    }

    /// Pending records for a patient, in stored order.
    pub fn pending_for(&self, patient_name: &str) -> StoreResult<Vec<VaccinationRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.is_pending() && r.patient_name == patient_name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordStatus;
    use chrono::NaiveDate;
    use serde_json::Map;

    fn record(id: &str, patient: &str, status: RecordStatus) -> VaccinationRecord {
        VaccinationRecord {
            id: id.into(),
            patient_name: patient.into(),
            vaccine_name: "Hepatitis B".into(),
            manufacturer: "GSK".into(),
            dose_number: 1,
            total_doses: 3,
            date_given: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            administered_by: None,
            notes: None,
            status,
            next_due_date: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = RecordStore::new(MemoryStore::new());
        assert_eq!(store.key(), "vaccineRecords");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_preserves_order() {
        let store = RecordStore::new(SqliteStore::open_in_memory().unwrap());
        let records = vec![
            record("b", "John Doe", RecordStatus::Completed),
            record("a", "John Doe", RecordStatus::Pending),
        ];

        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_corrupt_payload_is_an_error() {
        let kv = MemoryStore::new();
        kv.set("vaccineRecords", "{not json").unwrap();

        let store = RecordStore::new(kv);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_custom_key() {
        let kv = MemoryStore::new();
        let config = StoreConfig {
            records_key: "records-v2".into(),
            ..StoreConfig::default()
        };
        let store = RecordStore::with_config(&kv, &config);
        store.save(&[record("a", "Jane", RecordStatus::Completed)]).unwrap();

        assert!(kv.get("records-v2").unwrap().is_some());
        assert!(kv.get("vaccineRecords").unwrap().is_none());
    }

    #[test]
    fn test_find_and_pending_for() {
        let store = RecordStore::new(MemoryStore::new());
        store
            .save(&[
                record("a", "John Doe", RecordStatus::Completed),
                record("b", "John Doe", RecordStatus::Pending),
                record("c", "Jane Roe", RecordStatus::Pending),
            ])
            .unwrap();

        assert_eq!(store.find("c").unwrap().map(|r| r.patient_name), Some("Jane Roe".into()));
        assert!(store.find("zzz").unwrap().is_none());

        let pending = store.pending_for("John Doe").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "b");
    }

    #[test]
    fn test_load_reads_legacy_timestamps_at_offset() {
        let kv = MemoryStore::new();
        kv.set(
            "vaccineRecords",
            r#"[{"id":"a","patientName":"Jane","vaccineName":"Typhoid","doseNumber":1,
                "totalDoses":1,"dateGiven":"2023-12-31T18:15:00.000Z","status":"completed"}]"#,
        )
        .unwrap();

        let config = StoreConfig::with_utc_offset_minutes(5 * 60 + 45).unwrap();
        let store = RecordStore::with_config(&kv, &config);
        let records = store.load().unwrap();
        assert_eq!(records[0].date_given, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        store.save(&records).unwrap();
        let raw = kv.get("vaccineRecords").unwrap().unwrap();
        assert!(raw.contains(r#""dateGiven":"2024-01-01""#));
    }

    #[test]
    fn test_boxed_store() {
        let kv: Box<dyn KeyValueStore + Send> = Box::new(MemoryStore::new());
        let store = RecordStore::new(kv);
        store.save(&[]).unwrap();
        assert_eq!(store.inner().get("vaccineRecords").unwrap(), Some("[]".into()));
    }
}
