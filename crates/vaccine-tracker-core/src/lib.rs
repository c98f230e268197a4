//! Vaccine Tracker Core Library
//!
//! Local-first vaccination record keeping for the mobile app.
//!
//! # Submission flow
//!
//! ```text
//! Form → Validation ──✗──▶ ValidationError (nothing read or written)
//!            │
//!            ▼
//!     Read "vaccineRecords" (full list)
//!            │
//!            ▼
//!     Reconcile ─── pending match? ──┬── yes: complete in place
//!            │                       └── no:  append new record
//!            ▼
//!     Next-due date (COVID-19 21d / Hepatitis B 30d / HPV 60d / else 30d)
//!            │
//!            ▼
//!     Write full list ──✗──▶ PersistenceError (form kept for retry)
//!            │
//!            ▼
//!     Navigate to records
//! ```
//!
//! # Modules
//!
//! - [`config`]: Constants and storage configuration
//! - [`models`]: Domain types (VaccinationRecord, Submission, vaccine catalog)
//! - [`reconciler`]: Pending/completed reconciliation and dose schedule
//! - [`store`]: Key-value persistence (SQLite and in-memory)
//! - [`service`]: End-to-end submission flow

pub mod config;
pub mod models;
pub mod reconciler;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use models::{
    DoseCounters, RecordStatus, Submission, ValidationError, VaccinationRecord, VaccineChoice,
};
pub use reconciler::{reconcile, DoseSchedule, IntervalRule, Outcome, Reconciler, Reconciliation};
pub use service::{Navigator, NoopNavigator, SubmitError, SubmitReport, VaccinationRecorder};
pub use store::{KeyValueStore, MemoryStore, RecordStore, SqliteStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use config::StoreConfig;
use models::calendar_date;
use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VaccineTrackerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ValidationError> for VaccineTrackerError {
    fn from(e: ValidationError) -> Self {
        VaccineTrackerError::Validation(e.to_string())
    }
}

impl From<StoreError> for VaccineTrackerError {
    fn from(e: StoreError) -> Self {
        VaccineTrackerError::Persistence(e.to_string())
    }
}

impl From<SubmitError> for VaccineTrackerError {
    fn from(e: SubmitError) -> Self {
        let message = e.user_message();
        match e {
            SubmitError::Validation(v) => v.into(),
            SubmitError::Persistence(_) => VaccineTrackerError::Persistence(message),
        }
    }
}

impl From<models::CatalogError> for VaccineTrackerError {
    fn from(e: models::CatalogError) -> Self {
        VaccineTrackerError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VaccineTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VaccineTrackerError::Persistence(format!("Lock poisoned: {}", e))
    }
}

fn parse_ffi_date(value: &str) -> Result<NaiveDate, VaccineTrackerError> {
    calendar_date::parse(value)
        .ok_or_else(|| VaccineTrackerError::InvalidInput(format!("Invalid date: {}", value)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

type SharedStore = RecordStore<Box<dyn KeyValueStore + Send>>;

/// Open or create the record store at the given path.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<VaccineTrackerCore>, VaccineTrackerError> {
    open_store_with_config(&path, &StoreConfig::default())
}

/// Open or create the record store for a device `utc_offset_minutes` east of UTC.
///
/// The offset decides which calendar day timestamp dates written by earlier
/// app versions fall on.
#[uniffi::export]
pub fn open_store_with_utc_offset(
    path: String,
    utc_offset_minutes: i32,
) -> Result<Arc<VaccineTrackerCore>, VaccineTrackerError> {
    let config = StoreConfig::with_utc_offset_minutes(utc_offset_minutes).ok_or_else(|| {
        VaccineTrackerError::InvalidInput(format!(
            "Invalid UTC offset: {} minutes",
            utc_offset_minutes
        ))
    })?;
    open_store_with_config(&path, &config)
}

/// Create an in-memory record store (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Arc<VaccineTrackerCore> {
    VaccineTrackerCore::with_kv(Box::new(MemoryStore::new()), &StoreConfig::default())
}

fn open_store_with_config(
    path: &str,
    config: &StoreConfig,
) -> Result<Arc<VaccineTrackerCore>, VaccineTrackerError> {
    let kv = SqliteStore::open(path)?;
    tracing::info!(
        path = %path,
        utc_offset = %config.utc_offset,
        "Opened vaccination record store"
    );
    Ok(VaccineTrackerCore::with_kv(Box::new(kv), config))
}

/// Install a log subscriber.
///
/// `filter` takes precedence over `RUST_LOG`. Calling this more than once
/// keeps the first subscriber.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let env_filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
    };

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
    {
        tracing::info!("{} core v{}", config::APP_NAME, config::APP_VERSION);
    }
}

// =========================================================================
// Catalog & Form Helpers (exported to FFI)
// =========================================================================

/// Vaccine picker entries, ending with the custom-name option.
#[uniffi::export]
pub fn vaccine_picker_options() -> Vec<String> {
    models::vaccine_picker_options()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Manufacturer picker entries.
#[uniffi::export]
pub fn manufacturers() -> Vec<String> {
    models::MANUFACTURERS.iter().map(|m| m.to_string()).collect()
}

/// Suggest common vaccines for a typed query.
#[uniffi::export]
pub fn suggest_vaccines(query: String, limit: u32) -> Vec<String> {
    models::suggest_vaccines(&query, limit as usize)
        .into_iter()
        .map(String::from)
        .collect()
}

/// Whether a picked option asks for a typed name.
#[uniffi::export]
pub fn is_custom_vaccine_option(option: String) -> bool {
    VaccineChoice::from_option(&option) == VaccineChoice::Custom
}

/// Accept a typed custom vaccine name (trimmed, non-empty).
#[uniffi::export]
pub fn custom_vaccine_name(text: String) -> Result<String, VaccineTrackerError> {
    Ok(models::custom_vaccine_name(&text)?)
}

/// Parse a dose counter text field.
#[uniffi::export]
pub fn parse_dose_field(text: String) -> i32 {
    models::parse_dose_field(&text)
}

/// A reset form dated `today` (`YYYY-MM-DD`).
#[uniffi::export]
pub fn blank_submission(today: String) -> Result<FfiSubmission, VaccineTrackerError> {
    let date = parse_ffi_date(&today)?;
    Ok(Submission::blank(date).into())
}

/// Next-due date preview for the form, as `YYYY-MM-DD`.
///
/// Dose counters are checked like a submission's.
#[uniffi::export]
pub fn next_due_date(
    vaccine_name: String,
    dose_number: i32,
    total_doses: i32,
    date_given: String,
) -> Result<Option<String>, VaccineTrackerError> {
    let counters = DoseCounters::new(dose_number, total_doses)?;
    let date = parse_ffi_date(&date_given)?;
    let due = DoseSchedule::standard().next_due_date(
        &vaccine_name,
        counters.dose_number,
        counters.total_doses,
        date,
    );
    Ok(due.as_ref().map(calendar_date::format))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe record store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VaccineTrackerCore {
    store: Arc<Mutex<SharedStore>>,
}

impl VaccineTrackerCore {
    fn with_kv(kv: Box<dyn KeyValueStore + Send>, config: &StoreConfig) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::new(Mutex::new(RecordStore::with_config(kv, config))),
        })
    }
}

#[uniffi::export]
impl VaccineTrackerCore {
    /// Validate, reconcile and save a dose event.
    ///
    /// `navigator` is called once after a successful save.
    pub fn submit_vaccination(
        &self,
        submission: FfiSubmission,
        navigator: Box<dyn Navigator>,
    ) -> Result<FfiSubmitResult, VaccineTrackerError> {
        let submission = Submission::try_from(submission)?;
        let store = self.store.lock()?;
        let report = VaccinationRecorder::new(&*store).submit(&submission, &*navigator)?;
        Ok(report.into())
    }

    /// All records in stored order.
    pub fn list_records(&self) -> Result<Vec<FfiVaccinationRecord>, VaccineTrackerError> {
        let store = self.store.lock()?;
        let records = store.load()?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Pending records for a patient.
    pub fn pending_records(
        &self,
        patient_name: String,
    ) -> Result<Vec<FfiVaccinationRecord>, VaccineTrackerError> {
        let store = self.store.lock()?;
        let records = store.pending_for(&patient_name)?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Get a record by identifier.
    pub fn get_record(
        &self,
        id: String,
    ) -> Result<Option<FfiVaccinationRecord>, VaccineTrackerError> {
        let store = self.store.lock()?;
        let record = store.find(&id)?;
        Ok(record.map(|r| r.into()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe form submission. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub patient_name: String,
    pub vaccine_name: String,
    pub manufacturer: String,
    pub dose_number: i32,
    pub total_doses: i32,
    pub date_given: String,
    pub administered_by: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<FfiSubmission> for Submission {
    type Error = VaccineTrackerError;

    fn try_from(s: FfiSubmission) -> Result<Self, Self::Error> {
        Ok(Submission {
            date_given: parse_ffi_date(&s.date_given)?,
            patient_name: s.patient_name,
            vaccine_name: s.vaccine_name,
            manufacturer: s.manufacturer,
            dose_number: s.dose_number,
            total_doses: s.total_doses,
            administered_by: s.administered_by,
            notes: s.notes,
        })
    }
}

impl From<Submission> for FfiSubmission {
    fn from(s: Submission) -> Self {
        Self {
            date_given: calendar_date::format(&s.date_given),
            patient_name: s.patient_name,
            vaccine_name: s.vaccine_name,
            manufacturer: s.manufacturer,
            dose_number: s.dose_number,
            total_doses: s.total_doses,
            administered_by: s.administered_by,
            notes: s.notes,
        }
    }
}

/// FFI-safe vaccination record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVaccinationRecord {
    pub id: String,
    pub patient_name: String,
    pub vaccine_name: String,
    pub manufacturer: String,
    pub dose_number: u32,
    pub total_doses: u32,
    pub date_given: String,
    pub administered_by: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub next_due_date: Option<String>,
}

impl From<VaccinationRecord> for FfiVaccinationRecord {
    fn from(r: VaccinationRecord) -> Self {
        Self {
            date_given: calendar_date::format(&r.date_given),
            next_due_date: r.next_due_date.as_ref().map(calendar_date::format),
            status: r.status.as_str().to_string(),
            id: r.id,
            patient_name: r.patient_name,
            vaccine_name: r.vaccine_name,
            manufacturer: r.manufacturer,
            dose_number: r.dose_number,
            total_doses: r.total_doses,
            administered_by: r.administered_by,
            notes: r.notes,
        }
    }
}

/// FFI-safe outcome kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiOutcome {
    Created,
    CompletedPending,
}

/// FFI-safe submission result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmitResult {
    pub outcome: FfiOutcome,
    pub record_id: String,
    pub message: String,
    pub record: FfiVaccinationRecord,
}

impl From<SubmitReport> for FfiSubmitResult {
    fn from(report: SubmitReport) -> Self {
        let outcome = match report.outcome {
            Outcome::Created { .. } => FfiOutcome::Created,
            Outcome::CompletedPending { .. } => FfiOutcome::CompletedPending,
        };
        Self {
            outcome,
            record_id: report.outcome.id().to_string(),
            message: report.message,
            record: report.record.into(),
        }
    }
}
