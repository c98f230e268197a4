//! Application-level constants and storage configuration.

use chrono::{FixedOffset, Offset, Utc};

/// Application name
pub const APP_NAME: &str = "Vaccine Tracker";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage key the record collection lives under
pub const RECORDS_KEY: &str = "vaccineRecords";

/// Patient name a freshly reset form starts with
pub const DEFAULT_PATIENT_NAME: &str = "John Doe";

/// Log filter used when neither the caller nor `RUST_LOG` sets one.
pub fn default_log_filter() -> &'static str {
    "vaccine_tracker_core=info"
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key holding the serialized record list
    pub records_key: String,
    /// Device UTC offset, used to read timestamp dates from earlier app versions
    pub utc_offset: FixedOffset,
}

impl StoreConfig {
    /// Default configuration for a device `minutes` east of UTC.
    ///
    /// Returns `None` for offsets of a day or more.
    pub fn with_utc_offset_minutes(minutes: i32) -> Option<Self> {
        let utc_offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self {
            utc_offset,
            ..Self::default()
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            records_key: RECORDS_KEY.to_string(),
            utc_offset: Utc.fix(),
        }
    }
}
