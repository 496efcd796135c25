use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::extract::{Clock, DocumentKind, FeatureBundle, FeatureExtractor};
use crate::scoring::{rank, MatchResult, MatchScorer};
use crate::skills::SkillTaxonomy;

/// A plain-text document and the identifier results are reported under.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Extracts features on the blocking pool, at most `max_concurrency`
/// documents at a time, then scores and ranks.
pub struct MatchPipeline {
    extractor: Arc<FeatureExtractor>,
    scorer: Arc<MatchScorer>,
    max_concurrency: usize,
}

impl MatchPipeline {
    pub fn new(extractor: FeatureExtractor, scorer: MatchScorer, max_concurrency: usize) -> Self {
        Self {
            extractor: Arc::new(extractor),
            scorer: Arc::new(scorer),
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn from_config(taxonomy: Arc<SkillTaxonomy>, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let extractor = FeatureExtractor::from_config(taxonomy.clone(), &config.extraction, clock);
        let scorer = MatchScorer::with_config(taxonomy, config.scoring.clone());
        Self::new(extractor, scorer, config.pipeline.max_concurrency)
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Feature bundles in input order.
    pub async fn extract_all(
        &self,
        kind: DocumentKind,
        documents: Vec<Document>,
    ) -> Result<Vec<(String, FeatureBundle)>> {
        let total = documents.len();
        let bundles: Vec<(String, FeatureBundle)> = stream::iter(documents)
            .map(|document| {
                let extractor = self.extractor.clone();
                async move {
                    let id = document.id.clone();
                    tokio::task::spawn_blocking(move || {
                        let bundle = extractor.extract(kind, &document.text);
                        (document.id, bundle)
                    })
                    .await
                    .with_context(|| format!("Feature extraction task for {} failed", id))
                }
            })
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        debug!("Extracted {} {:?} documents", total, kind);
        Ok(bundles)
    }

    /// Rank every job posting against one resume.
    pub async fn run(&self, resume: Document, jobs: Vec<Document>) -> Result<Vec<MatchResult>> {
        info!(
            "Matching resume {} against {} job postings (concurrency {})",
            resume.id,
            jobs.len(),
            self.max_concurrency
        );

        let resume_id = resume.id.clone();
        let mut resumes = self.extract_all(DocumentKind::Resume, vec![resume]).await?;
        let (_, resume_features) = resumes
            .pop()
            .context("Resume extraction produced no features")?;

        let jobs = self.extract_all(DocumentKind::Job, jobs).await?;

        let results = jobs
            .iter()
            .map(|(job_id, job)| {
                self.scorer
                    .match_result(&resume_id, &resume_features, job_id, job)
            })
            .collect();
        Ok(rank(results))
    }
}
