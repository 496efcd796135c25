//! Resume/job match engine: section segmentation, skill taxonomy matching,
//! experience estimation and weighted match scoring.

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod scoring;
pub mod skills;
pub mod text;

pub use extract::{DocumentKind, FeatureBundle, FeatureExtractor};
pub use pipeline::{Document, MatchPipeline};
pub use scoring::{MatchResult, MatchScorer};
pub use skills::SkillTaxonomy;
