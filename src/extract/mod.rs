//! Feature extraction: sections, skills, experience and term frequencies.

mod contact;
mod duration;
mod requirements;
mod sections;

pub use contact::ContactInfo;
pub use duration::{Clock, DateRange, DurationEstimator, FixedClock, OverlapPolicy, SystemClock};
pub use requirements::RequirementExtractor;
pub use sections::{segment, Section, SectionKind, SectionTable, Sections};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::BundleError;
use crate::skills::SkillTaxonomy;
use crate::text::TextNormalizer;

/// Which side of a match a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Resume,
    Job,
}

impl DocumentKind {
    pub fn section_table(&self) -> &'static SectionTable {
        match self {
            DocumentKind::Resume => SectionTable::resume(),
            DocumentKind::Job => SectionTable::job(),
        }
    }
}

/// Source format reported by the text-extraction step. Only plain text is
/// accepted here; the binary formats are converted upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl ContentKind {
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(ContentKind::Pdf),
            "docx" => Some(ContentKind::Docx),
            "doc" => Some(ContentKind::Doc),
            "txt" | "text" | "md" => Some(ContentKind::Txt),
            _ => None,
        }
    }

    pub fn is_plain_text(&self) -> bool {
        matches!(self, ContentKind::Txt)
    }
}

/// Skills, experience and term counts of one resume or job posting.
///
/// For a resume `experience_years` is the estimated work history; for a job
/// posting it is the required experience, `None` when the posting does not
/// say.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureBundle")]
pub struct FeatureBundle {
    skills: BTreeSet<String>,
    experience_years: Option<f64>,
    word_frequencies: BTreeMap<String, u32>,
}

/// Stored shape, including the older per-side experience keys.
#[derive(Deserialize)]
struct RawFeatureBundle {
    #[serde(default)]
    skills: Vec<String>,
    #[serde(
        default,
        alias = "work_experience_years",
        alias = "required_experience_years"
    )]
    experience_years: Option<f64>,
    #[serde(default)]
    word_frequencies: BTreeMap<String, u32>,
}

impl TryFrom<RawFeatureBundle> for FeatureBundle {
    type Error = BundleError;

    fn try_from(raw: RawFeatureBundle) -> Result<Self, Self::Error> {
        FeatureBundle::new(raw.skills, raw.experience_years, raw.word_frequencies)
    }
}

impl FeatureBundle {
    /// Skill names are trimmed and lowercased, blanks dropped. Experience must
    /// be finite and non-negative.
    pub fn new<I, S>(
        skills: I,
        experience_years: Option<f64>,
        word_frequencies: BTreeMap<String, u32>,
    ) -> Result<Self, BundleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(years) = experience_years {
            if !years.is_finite() || years < 0.0 {
                return Err(BundleError::InvalidExperience(years));
            }
        }

        let skills = skills
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let word_frequencies = word_frequencies
            .into_iter()
            .filter(|(token, count)| !token.is_empty() && *count > 0)
            .collect();

        Ok(Self {
            skills,
            experience_years,
            word_frequencies,
        })
    }

    /// A bundle carrying no signal at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.experience_years.is_none() && self.word_frequencies.is_empty()
    }

    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    pub fn experience_years(&self) -> Option<f64> {
        self.experience_years
    }

    pub fn word_frequencies(&self) -> &BTreeMap<String, u32> {
        &self.word_frequencies
    }
}

/// Turns resume and job posting text into [`FeatureBundle`]s.
pub struct FeatureExtractor {
    taxonomy: Arc<SkillTaxonomy>,
    normalizer: TextNormalizer,
    durations: DurationEstimator,
    requirements: RequirementExtractor,
    top_terms: usize,
    lemmatize: bool,
}

impl FeatureExtractor {
    pub fn new(taxonomy: Arc<SkillTaxonomy>) -> Self {
        Self::from_config(taxonomy, &ExtractionConfig::default(), Arc::new(SystemClock))
    }

    pub fn from_config(
        taxonomy: Arc<SkillTaxonomy>,
        config: &ExtractionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            taxonomy,
            normalizer: TextNormalizer::new(),
            durations: DurationEstimator::new(clock, config.overlap_policy),
            requirements: RequirementExtractor::new(),
            top_terms: config.top_terms,
            lemmatize: config.lemmatize,
        }
    }

    pub fn extract(&self, kind: DocumentKind, text: &str) -> FeatureBundle {
        match kind {
            DocumentKind::Resume => self.extract_resume(text),
            DocumentKind::Job => self.extract_job(text),
        }
    }

    pub fn extract_resume(&self, text: &str) -> FeatureBundle {
        if text.trim().is_empty() {
            debug!("Empty resume text, returning empty features");
            return FeatureBundle::empty();
        }

        let sections = segment(text, SectionTable::resume());

        let mut skills = self.skills_in(
            &sections,
            &[
                SectionKind::Skills,
                SectionKind::Experience,
                SectionKind::Projects,
            ],
        );
        // Skills listed outside any recognised section still count.
        skills.extend(self.taxonomy.extract_skills(text));

        let experience_text = sections.get(SectionKind::Experience).unwrap_or(text);
        let years = self.durations.estimate_years(experience_text);

        let bundle = FeatureBundle {
            skills,
            experience_years: Some(years),
            word_frequencies: self.word_frequencies(text),
        };
        debug!(
            "Resume features: {} sections, {} skills, {} years, {} terms",
            sections.len(),
            bundle.skills.len(),
            years,
            bundle.word_frequencies.len()
        );
        bundle
    }

    pub fn extract_job(&self, text: &str) -> FeatureBundle {
        if text.trim().is_empty() {
            debug!("Empty job text, returning empty features");
            return FeatureBundle::empty();
        }

        let sections = segment(text, SectionTable::job());

        let mut skills = self.skills_in(
            &sections,
            &[
                SectionKind::Requirements,
                SectionKind::Responsibilities,
                SectionKind::Preferred,
            ],
        );
        // Too little signal from the sections: scan everything.
        if sections.is_empty() || skills.len() < 3 {
            skills.extend(self.taxonomy.extract_skills(text));
        }

        // The whole posting when the section states no figure.
        let required = sections
            .get(SectionKind::Requirements)
            .and_then(|requirements| self.requirements.required_years(requirements))
            .or_else(|| self.requirements.required_years(text));

        let bundle = FeatureBundle {
            skills,
            experience_years: required,
            word_frequencies: self.word_frequencies(text),
        };
        debug!(
            "Job features: {} sections, {} skills, required years {:?}, {} terms",
            sections.len(),
            bundle.skills.len(),
            required,
            bundle.word_frequencies.len()
        );
        bundle
    }

    pub fn extract_contact(&self, text: &str) -> ContactInfo {
        ContactInfo::from_text(text)
    }

    /// Sections of `text` as detected for `kind`.
    pub fn sections(&self, kind: DocumentKind, text: &str) -> Sections {
        segment(text, kind.section_table())
    }

    /// The `top_terms` most frequent tokens. Ties keep first-seen order.
    pub fn word_frequencies(&self, text: &str) -> BTreeMap<String, u32> {
        let tokens = self.normalizer.preprocess(text, self.lemmatize);

        let mut counts: HashMap<&str, (u32, usize)> = HashMap::new();
        for (position, token) in tokens.iter().enumerate() {
            counts.entry(token.as_str()).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, (u32, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then_with(|| a.1 .1.cmp(&b.1 .1)));
        ranked.truncate(self.top_terms);

        ranked
            .into_iter()
            .map(|(token, (count, _))| (token.to_string(), count))
            .collect()
    }

    fn skills_in(&self, sections: &Sections, kinds: &[SectionKind]) -> BTreeSet<String> {
        kinds
            .iter()
            .filter_map(|kind| sections.get(*kind))
            .flat_map(|text| self.taxonomy.extract_skills(text))
            .collect()
    }
}
