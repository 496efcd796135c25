use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

use match_engine::config::{Config, ExtractionConfig};
use match_engine::extract::{DocumentKind, FeatureBundle, FeatureExtractor, FixedClock, OverlapPolicy};
use match_engine::pipeline::{Document, MatchPipeline};
use match_engine::scoring::{MatchResult, MatchScorer};
use match_engine::skills::SkillTaxonomy;

const RESUME: &str = "Jane Doe
jane.doe@gmail.com | (617)-372-4007 | linkedin.com/in/jane-doe

SUMMARY
Backend engineer who likes boring, reliable systems.

WORK EXPERIENCE
Senior Software Engineer | TechCorp | Jan 2020 - Present
- Built payment APIs in Python and Django on PostgreSQL
- Moved deployments to Kubernetes with GitHub Actions

Software Engineer | StartupCo | Mar 2018 - Dec 2019
- Node.js services, Redis caching, CI/CD pipelines

EDUCATION
B.Sc. Computer Science, State University, 2014 - 2018

TECHNICAL SKILLS
Python, JS, SQL, Docker, AWS
";

const BACKEND_JOB: &str = "Senior Python Engineer

About the company
We move money for small businesses.

Responsibilities
- Own payment APIs built with Python and Django
- Run services on AWS and Kubernetes

Requirements:
- 5+ years of experience building backend systems
- Strong SQL, PostgreSQL and Docker skills

Nice to have:
- Kafka, Terraform
";

const DATA_JOB: &str = "Data Scientist

Requirements:
- 3-5 years of experience with machine learning
- Python, pandas, scikit-learn, TensorFlow

Preferred qualifications
- Spark, Airflow
";

fn taxonomy() -> Arc<SkillTaxonomy> {
    Arc::new(SkillTaxonomy::bundled().expect("bundled taxonomy loads"))
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()))
}

fn extractor() -> FeatureExtractor {
    FeatureExtractor::from_config(taxonomy(), &ExtractionConfig::default(), clock())
}

#[test]
fn resume_extraction_end_to_end() {
    let features = extractor().extract(DocumentKind::Resume, RESUME);

    for skill in [
        "python",
        "django",
        "postgresql",
        "kubernetes",
        "github actions",
        "node.js",
        "redis",
        "ci/cd",
        "javascript",
        "sql",
        "docker",
        "aws",
    ] {
        assert!(features.skills().contains(skill), "missing {skill}");
    }
    assert!(!features.skills().contains("js"));

    // Jan 2020 - Jan 2023 (36) + Mar 2018 - Dec 2019 (22); education years are not work
    assert_eq!(features.experience_years(), Some(4.8));
    assert!(features.word_frequencies().len() <= 100);
}

#[test]
fn job_extraction_end_to_end() {
    let features = extractor().extract(DocumentKind::Job, BACKEND_JOB);

    for skill in [
        "python",
        "django",
        "aws",
        "kubernetes",
        "sql",
        "postgresql",
        "docker",
        "kafka",
        "terraform",
    ] {
        assert!(features.skills().contains(skill), "missing {skill}");
    }
    assert_eq!(features.experience_years(), Some(5.0));

    let data = extractor().extract(DocumentKind::Job, DATA_JOB);
    assert!(data.skills().contains("machine learning"));
    assert_eq!(data.experience_years(), Some(4.0));
}

#[test]
fn stored_bundles_score_like_fresh_ones() {
    let extractor = extractor();
    let scorer = MatchScorer::new(taxonomy());

    let resume = extractor.extract_resume(RESUME);
    let job = extractor.extract_job(BACKEND_JOB);
    let fresh = scorer.match_result("jane", &resume, "backend", &job);

    let resume_json = serde_json::to_string(&resume).unwrap();
    let job_json = serde_json::to_string(&job).unwrap();
    let resume: FeatureBundle = serde_json::from_str(&resume_json).unwrap();
    let job: FeatureBundle = serde_json::from_str(&job_json).unwrap();
    let stored = scorer.match_result("jane", &resume, "backend", &job);

    assert_eq!(fresh, stored);

    let result_json = serde_json::to_string(&stored).unwrap();
    let back: MatchResult = serde_json::from_str(&result_json).unwrap();
    assert_eq!(back, stored);
}

#[test]
fn backend_resume_prefers_backend_job() {
    let extractor = extractor();
    let scorer = MatchScorer::new(taxonomy());

    let resume = extractor.extract_resume(RESUME);
    let backend = extractor.extract_job(BACKEND_JOB);
    let data = extractor.extract_job(DATA_JOB);

    let ranked = scorer.rank("jane", &resume, [("data", &data), ("backend", &backend)]);
    assert_eq!(ranked[0].job_id, "backend");
    assert!(ranked[0].match_score > ranked[1].match_score);
    assert!(ranked[0].missing_skills.contains(&"kafka".to_string()));
    assert!(ranked.iter().all(|r| (0.0..=100.0).contains(&r.match_score)));

    // 4.8 years against 5 required lands in the partial-credit window
    assert_eq!(ranked[0].breakdown.experience, 0.95);
}

#[test]
fn reference_scenario_from_stored_bundles() {
    let scorer = MatchScorer::new(taxonomy());
    let words = BTreeMap::from([("python".to_string(), 3), ("database".to_string(), 1)]);

    let resume = FeatureBundle::new(["python", "sql"], Some(3.0), words.clone()).unwrap();
    let job = FeatureBundle::new(["python", "django", "sql"], Some(3.0), words).unwrap();

    let result = scorer.match_result("r", &resume, "j", &job);
    assert_eq!(result.match_score, 83.35);
    assert_eq!(result.matched_skills, vec!["python", "sql"]);
    assert_eq!(result.missing_skills, vec!["django"]);
}

#[test]
fn union_policy_is_configurable() {
    let text = "Experience\nAcme, Jan 2018 - Dec 2019\nGlobex, Jan 2019 - Dec 2020\n";
    let additive = extractor().extract_resume(text);

    let config = ExtractionConfig {
        overlap_policy: OverlapPolicy::Union,
        ..ExtractionConfig::default()
    };
    let union = FeatureExtractor::from_config(taxonomy(), &config, clock()).extract_resume(text);

    assert_eq!(additive.experience_years(), Some(4.0));
    assert_eq!(union.experience_years(), Some(3.0));
}

#[tokio::test]
async fn pipeline_ranks_many_postings() {
    let pipeline = MatchPipeline::from_config(taxonomy(), &Config::default(), clock());
    let jobs = vec![
        Document::new("data", DATA_JOB),
        Document::new("backend", BACKEND_JOB),
        Document::new("blank", "   "),
    ];

    let results = pipeline
        .run(Document::new("jane", RESUME), jobs)
        .await
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.job_id.as_str()).collect();
    assert_eq!(ids, vec!["backend", "data", "blank"]);
    assert_eq!(results[2].match_score, 0.0);
    assert_eq!(results[0].resume_experience_years, 4.8);
}
