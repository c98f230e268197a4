//! Vaccination record models.

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::submission::{DoseCounters, Submission};

/// Record status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Dose has been administered
    Completed,
    /// Dose is scheduled or expected but not yet administered
    Pending,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Completed => "completed",
            RecordStatus::Pending => "pending",
        }
    }
}

/// One dose event for one patient, as stored on the device.
///
/// Field names follow the camelCase layout the mobile app has always
/// written, so collections saved by earlier app versions load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationRecord {
    /// Opaque unique identifier
    pub id: String,
    /// Patient name (matched exactly during reconciliation)
    pub patient_name: String,
    /// Vaccine name (matched case-insensitively during reconciliation)
    pub vaccine_name: String,
    /// Manufacturer, empty when unknown
    #[serde(default)]
    pub manufacturer: String,
    /// Dose number within the regimen, 1-based
    pub dose_number: u32,
    /// Total doses in the regimen
    pub total_doses: u32,
    /// Date the dose was given
    #[serde(with = "calendar_date")]
    pub date_given: NaiveDate,
    /// Who administered the dose
    #[serde(
        default,
        deserialize_with = "optional_text",
        serialize_with = "text_or_empty"
    )]
    pub administered_by: Option<String>,
    /// Free-text notes
    #[serde(
        default,
        deserialize_with = "optional_text",
        serialize_with = "text_or_empty"
    )]
    pub notes: Option<String>,
    /// Completed or pending
    pub status: RecordStatus,
    /// When the next dose in the regimen is due
    #[serde(
        default,
        with = "calendar_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_due_date: Option<NaiveDate>,
    /// Keys written by other screens, carried through rewrites untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VaccinationRecord {
    /// Build a new completed record from a validated submission.
    pub fn from_submission(
        id: String,
        submission: &Submission,
        counters: DoseCounters,
        next_due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            patient_name: submission.patient_name.clone(),
            vaccine_name: submission.vaccine_name.clone(),
            manufacturer: submission.manufacturer.clone(),
            dose_number: counters.dose_number,
            total_doses: counters.total_doses,
            date_given: submission.date_given,
            administered_by: submission.administered_by_text(),
            notes: submission.notes_text(),
            status: RecordStatus::Completed,
            next_due_date,
            extra: Map::new(),
        }
    }

    /// Overwrite the administration fields from a submission and mark completed.
    ///
    /// Identifier, patient name, vaccine name and any extra keys are kept.
    pub fn complete_with(
        &mut self,
        submission: &Submission,
        counters: DoseCounters,
        next_due_date: Option<NaiveDate>,
    ) {
        self.status = RecordStatus::Completed;
        self.date_given = submission.date_given;
        self.administered_by = submission.administered_by_text();
        self.notes = submission.notes_text();
        self.dose_number = counters.dose_number;
        self.total_doses = counters.total_doses;
        self.manufacturer = submission.manufacturer.clone();
        self.next_due_date = next_due_date;
    }

    pub fn is_pending(&self) -> bool {
        self.status == RecordStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == RecordStatus::Completed
    }

    /// Decode a stored collection.
    ///
    /// Timestamp dates written by earlier app versions are read as the
    /// calendar day at `offset`, the device's UTC offset when they were picked.
    pub fn list_from_json(json: &str, offset: &FixedOffset) -> serde_json::Result<Vec<Self>> {
        let mut raw: Vec<Value> = serde_json::from_str(json)?;
        for record in raw.iter_mut().filter_map(Value::as_object_mut) {
            for key in ["dateGiven", "nextDueDate"] {
                if let Some(Value::String(text)) = record.get_mut(key) {
                    if let Some(date) = calendar_date::parse_timestamp(text, offset) {
                        *text = calendar_date::format(&date);
                    }
                }
            }
        }
        serde_json::from_value(Value::Array(raw))
    }

    /// Check whether a submission for this patient and vaccine would complete this record.
    pub fn is_pending_match(&self, patient_name: &str, vaccine_name: &str) -> bool {
        self.is_pending()
            && self.patient_name == patient_name
            && self.vaccine_name.to_lowercase() == vaccine_name.to_lowercase()
    }
}

/// Empty strings were how the app stored "not provided".
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Written back the way the app stores "not provided".
fn text_or_empty<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// Calendar date serialization.
///
/// Writes `YYYY-MM-DD`. Reads that form or a full RFC 3339 timestamp,
/// keeping the date part in the timestamp's own offset.
pub mod calendar_date {
    use chrono::{DateTime, FixedOffset, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    /// Calendar day of an RFC 3339 timestamp as seen at `offset`.
    pub fn parse_timestamp(s: &str, offset: &FixedOffset) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(offset).date_naive())
    }

    /// Parse a stored or user-supplied date.
    pub fn parse(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    }

    pub fn format(date: &NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| de::Error::custom(format!("invalid calendar date: {}", s)))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(d) => serializer.serialize_str(&super::format(d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => super::parse(&s)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid calendar date: {}", s))),
                None => Ok(None),
            }
        }
    }
}
