use std::path::PathBuf;
use thiserror::Error;

/// Failures while building the skill taxonomy. Always fatal at startup.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Taxonomy dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Taxonomy dataset contains no skills")]
    Empty,

    #[error("Skill entry in {category}/{subcategory} has an empty name")]
    EmptyName {
        category: String,
        subcategory: String,
    },

    #[error("Canonical skill '{0}' is defined more than once")]
    DuplicateCanonical(String),

    #[error("Alias '{alias}' maps to both '{first}' and '{second}'")]
    AmbiguousAlias {
        alias: String,
        first: String,
        second: String,
    },
}

/// Rejected feature bundle values.
#[derive(Debug, Error, PartialEq)]
pub enum BundleError {
    #[error("Experience years must be a finite, non-negative number (got {0})")]
    InvalidExperience(f64),
}

/// Configuration values that deserialize fine but make no sense together.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Scoring weights must be non-negative (skill={skill}, experience={experience}, keyword={keyword})")]
    NegativeWeight {
        skill: f64,
        experience: f64,
        keyword: f64,
    },

    #[error("Scoring weights must sum to 1.0 (got {0})")]
    WeightSum(f64),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
