use serde::Deserialize;

use crate::error::SettingsError;
use crate::extract::OverlapPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
    pub extraction: ExtractionConfig,
    pub scoring: ScoringConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonomyConfig {
    /// Replaces the bundled dataset when set.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub top_terms: usize,
    pub lemmatize: bool,
    pub overlap_policy: OverlapPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub skill_weight: f64,
    pub experience_weight: f64,
    pub keyword_weight: f64,
    pub partial_credit_years: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub max_concurrency: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            top_terms: 100,
            lemmatize: true,
            overlap_policy: OverlapPolicy::Additive,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            skill_weight: 0.5,
            experience_weight: 0.3,
            keyword_weight: 0.2,
            partial_credit_years: 2.0,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}

impl Config {
    /// Defaults, then the optional config file, then `MATCH__*` environment variables.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        // Load .env file
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            // Set defaults
            .set_default("extraction.top_terms", 100)?
            .set_default("extraction.lemmatize", true)?
            .set_default("extraction.overlap_policy", "additive")?
            .set_default("scoring.skill_weight", 0.5)?
            .set_default("scoring.experience_weight", 0.3)?
            .set_default("scoring.keyword_weight", 0.2)?
            .set_default("scoring.partial_credit_years", 2.0)?
            .set_default("pipeline.max_concurrency", 4)?
            .add_source(config::File::with_name(path).required(false))
            // Load from environment
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .prefix("MATCH"),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.scoring.validate()?;
        if self.extraction.top_terms == 0 {
            return Err(SettingsError::Zero("extraction.top_terms"));
        }
        if self.pipeline.max_concurrency == 0 {
            return Err(SettingsError::Zero("pipeline.max_concurrency"));
        }
        Ok(())
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let (skill, experience, keyword) =
            (self.skill_weight, self.experience_weight, self.keyword_weight);
        if skill < 0.0 || experience < 0.0 || keyword < 0.0 {
            return Err(SettingsError::NegativeWeight {
                skill,
                experience,
                keyword,
            });
        }

        let sum = skill + experience + keyword;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(SettingsError::WeightSum(sum));
        }
        if self.partial_credit_years <= 0.0 {
            return Err(SettingsError::Zero("scoring.partial_credit_years"));
        }
        Ok(())
    }
}
