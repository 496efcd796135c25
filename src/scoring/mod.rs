//! Weighted resume/job match scoring.

mod ranking;
mod similarity;

pub use ranking::{rank, top_k};
pub use similarity::cosine;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::extract::FeatureBundle;
use crate::skills::SkillTaxonomy;

/// Per-dimension scores in [0, 1], rounded to three decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill: f64,
    pub experience: f64,
    pub keyword: f64,
}

/// Scored comparison of one resume with one job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub resume_id: String,
    pub job_id: String,
    /// 0-100, two decimals.
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub required_experience_years: Option<f64>,
    pub resume_experience_years: f64,
    #[serde(default)]
    pub breakdown: ScoreBreakdown,
}

/// Output of [`MatchScorer::score`], before identifiers are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub total: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Combines two feature bundles into a match score.
pub struct MatchScorer {
    taxonomy: Arc<SkillTaxonomy>,
    weights: ScoringConfig,
}

impl MatchScorer {
    pub fn new(taxonomy: Arc<SkillTaxonomy>) -> Self {
        Self::with_config(taxonomy, ScoringConfig::default())
    }

    pub fn with_config(taxonomy: Arc<SkillTaxonomy>, weights: ScoringConfig) -> Self {
        Self { taxonomy, weights }
    }

    /// Score `resume` against `job`. Pure: identical inputs give identical
    /// output.
    pub fn score(&self, resume: &FeatureBundle, job: &FeatureBundle) -> MatchScore {
        let resume_skills = self.taxonomy.canonicalize_all(resume.skills());
        let job_skills = self.taxonomy.canonicalize_all(job.skills());

        let matched_skills: Vec<String> = job_skills.intersection(&resume_skills).cloned().collect();
        let missing_skills: Vec<String> = job_skills.difference(&resume_skills).cloned().collect();

        if resume.is_empty() || job.is_empty() {
            debug!("Empty feature bundle, scoring as 0");
            return MatchScore {
                total: 0.0,
                breakdown: ScoreBreakdown::default(),
                matched_skills,
                missing_skills,
            };
        }

        let breakdown = ScoreBreakdown {
            skill: round_to(skill_score(&resume_skills, &job_skills), 3),
            experience: round_to(
                self.experience_score(
                    resume.experience_years().unwrap_or(0.0),
                    job.experience_years(),
                ),
                3,
            ),
            keyword: round_to(
                cosine(resume.word_frequencies(), job.word_frequencies()),
                3,
            ),
        };

        let weighted = self.weights.skill_weight * breakdown.skill
            + self.weights.experience_weight * breakdown.experience
            + self.weights.keyword_weight * breakdown.keyword;
        let total = round_to(weighted * 100.0, 2);

        debug!(
            "Match score {} (skill={}, experience={}, keyword={}, {} matched, {} missing)",
            total,
            breakdown.skill,
            breakdown.experience,
            breakdown.keyword,
            matched_skills.len(),
            missing_skills.len()
        );

        MatchScore {
            total,
            breakdown,
            matched_skills,
            missing_skills,
        }
    }

    /// Experience sufficiency in [0, 1].
    ///
    /// No requirement (or zero) is no barrier. Falling short by less than
    /// `partial_credit_years` earns between 0.5 and 1.0; beyond that the score
    /// is the plain ratio.
    pub fn experience_score(&self, resume_years: f64, required_years: Option<f64>) -> f64 {
        let required = match required_years {
            Some(required) if required > 0.0 => required,
            _ => return 1.0,
        };
        if resume_years >= required {
            return 1.0;
        }

        let window = self.weights.partial_credit_years;
        if resume_years >= required - window {
            return 0.5 + (resume_years - (required - window)) / (2.0 * window);
        }
        (resume_years / required).clamp(0.0, 1.0)
    }

    pub fn match_result(
        &self,
        resume_id: &str,
        resume: &FeatureBundle,
        job_id: &str,
        job: &FeatureBundle,
    ) -> MatchResult {
        let score = self.score(resume, job);
        MatchResult {
            resume_id: resume_id.to_string(),
            job_id: job_id.to_string(),
            match_score: score.total,
            matched_skills: score.matched_skills,
            missing_skills: score.missing_skills,
            required_experience_years: job.experience_years(),
            resume_experience_years: resume.experience_years().unwrap_or(0.0),
            breakdown: score.breakdown,
        }
    }

    /// Score one resume against many jobs, best first.
    pub fn rank<'a, I>(&self, resume_id: &str, resume: &FeatureBundle, jobs: I) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = (&'a str, &'a FeatureBundle)>,
    {
        let results = jobs
            .into_iter()
            .map(|(job_id, job)| self.match_result(resume_id, resume, job_id, job))
            .collect();
        rank(results)
    }
}

/// |resume ∩ job| / |job|; 0.0 when the job lists no skills.
fn skill_score(resume: &BTreeSet<String>, job: &BTreeSet<String>) -> f64 {
    if job.is_empty() {
        return 0.0;
    }
    job.intersection(resume).count() as f64 / job.len() as f64
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
