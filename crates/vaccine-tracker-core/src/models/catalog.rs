//! Vaccine and manufacturer suggestion lists for the pickers.

use std::cmp::Ordering;

use strsim::jaro_winkler;
use thiserror::Error;

/// Common vaccines, in picker order.
pub const COMMON_VACCINES: &[&str] = &[
    "COVID-19 mRNA (Pfizer-BioNTech)",
    "COVID-19 mRNA (Moderna)",
    "COVID-19 (Johnson & Johnson)",
    "Influenza (Flu)",
    "Hepatitis A",
    "Hepatitis B",
    "Measles-Mumps-Rubella (MMR)",
    "Tetanus-Diphtheria-Pertussis (Tdap)",
    "Varicella (Chickenpox)",
    "Pneumococcal",
    "Meningococcal",
    "HPV (Human Papillomavirus)",
    "Shingles (Zoster)",
    "Typhoid",
    "Yellow Fever",
];

/// Picker entry that switches to free-text vaccine entry.
pub const CUSTOM_VACCINE_OPTION: &str = "Enter Custom Name...";

/// Known manufacturers, in picker order.
pub const MANUFACTURERS: &[&str] = &[
    "Pfizer-BioNTech",
    "Moderna",
    "Johnson & Johnson",
    "AstraZeneca",
    "GSK",
    "Merck",
    "Sanofi",
    "Serum Institute",
    "Bharat Biotech",
    "Other",
];

/// Minimum Jaro-Winkler similarity for a fuzzy suggestion.
const FUZZY_THRESHOLD: f64 = 0.80;

/// Catalog errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Please enter a vaccine name")]
    EmptyCustomName,
}

/// What a vaccine picker selection means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaccineChoice {
    /// A concrete vaccine name
    Named(String),
    /// The user wants to type a name
    Custom,
}

impl VaccineChoice {
    /// Interpret a selected picker option.
    pub fn from_option(option: &str) -> Self {
        if option == CUSTOM_VACCINE_OPTION {
            VaccineChoice::Custom
        } else {
            VaccineChoice::Named(option.to_string())
        }
    }
}

/// All picker options: the common vaccines followed by the custom entry.
pub fn vaccine_picker_options() -> Vec<&'static str> {
    COMMON_VACCINES
        .iter()
        .copied()
        .chain(std::iter::once(CUSTOM_VACCINE_OPTION))
        .collect()
}

/// Accept a typed custom vaccine name.
pub fn custom_vaccine_name(text: &str) -> Result<String, CatalogError> {
    let name = text.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyCustomName);
    }
    Ok(name.to_string())
}

/// Rank common vaccines against a typed query.
///
/// Case-insensitive substring hits come first in picker order, then fuzzy
/// hits by descending similarity. An empty query lists everything.
pub fn suggest_vaccines(query: &str, limit: usize) -> Vec<&'static str> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return COMMON_VACCINES.iter().copied().take(limit).collect();
    }

    let mut substring_hits = Vec::new();
    let mut fuzzy_hits: Vec<(&'static str, f64)> = Vec::new();

    for &name in COMMON_VACCINES {
        let lower = name.to_lowercase();
        if lower.contains(&query) {
            substring_hits.push(name);
            continue;
        }

        let score = fuzzy_score(&query, &lower);
        if score >= FUZZY_THRESHOLD {
            fuzzy_hits.push((name, score));
        }
    }

    // Stable sort keeps picker order among equal scores
    fuzzy_hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    substring_hits
        .into_iter()
        .chain(fuzzy_hits.into_iter().map(|(name, _)| name))
        .take(limit)
        .collect()
}

/// Best of whole-name and leading-word similarity.
fn fuzzy_score(query: &str, lower_name: &str) -> f64 {
    let leading_word = lower_name
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or(lower_name);

    jaro_winkler(query, lower_name).max(jaro_winkler(query, leading_word))
}
