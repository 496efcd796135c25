use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Named parts of a resume or job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    // resume
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Summary,
    // job posting
    Responsibilities,
    Requirements,
    Preferred,
    Benefits,
    Company,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Projects => "projects",
            SectionKind::Certifications => "certifications",
            SectionKind::Summary => "summary",
            SectionKind::Responsibilities => "responsibilities",
            SectionKind::Requirements => "requirements",
            SectionKind::Preferred => "preferred",
            SectionKind::Benefits => "benefits",
            SectionKind::Company => "company",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: SectionKind,
    pub text: String,
}

/// Header phrases per section kind. Longer phrases come first so the
/// reported header is the most specific one.
const RESUME_HEADERS: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::Experience,
        &[
            r"professional\s+experience",
            r"relevant\s+experience",
            r"work\s+experience",
            r"employment\s+history",
            r"work\s+history",
            r"career\s+history",
            r"employment",
            r"experience",
        ],
    ),
    (
        SectionKind::Education,
        &[
            r"education\s+(?:and|&)\s+training",
            r"academic\s+background",
            r"education",
        ],
    ),
    (
        SectionKind::Skills,
        &[
            r"technical\s+skills",
            r"skills\s+(?:and|&)\s+\w+",
            r"core\s+competencies",
            r"areas\s+of\s+expertise",
            r"skills",
            r"expertise",
            r"technologies",
        ],
    ),
    (
        SectionKind::Projects,
        &[r"personal\s+projects", r"academic\s+projects", r"projects"],
    ),
    (
        SectionKind::Certifications,
        &[
            r"licenses\s+(?:and|&)\s+certifications",
            r"certifications?",
            r"certificates",
            r"accreditations",
        ],
    ),
    (
        SectionKind::Summary,
        &[
            r"professional\s+summary",
            r"summary",
            r"profile",
            r"objective",
            r"about\s+me",
        ],
    ),
];

const JOB_HEADERS: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::Responsibilities,
        &[
            r"key\s+responsibilities",
            r"responsibilities",
            r"duties",
            r"what\s+you(?:'|’)?ll\s+do",
            r"what\s+you\s+will\s+do",
            r"role\s+description",
            r"position\s+overview",
            r"the\s+role",
        ],
    ),
    (
        SectionKind::Requirements,
        &[
            r"minimum\s+qualifications",
            r"basic\s+qualifications",
            r"required\s+qualifications",
            r"required\s+skills",
            r"requirements",
            r"qualifications",
            r"what\s+you(?:'|’)?ll\s+need",
            r"what\s+we(?:'|’)?re\s+looking\s+for",
            r"who\s+you\s+are",
        ],
    ),
    (
        SectionKind::Preferred,
        &[
            r"preferred\s+qualifications",
            r"preferred\s+skills",
            r"desired\s+skills",
            r"nice\s+to\s+haves?",
            r"bonus\s+points",
            r"pluses",
        ],
    ),
    (
        SectionKind::Benefits,
        &[r"what\s+we\s+offer", r"benefits", r"perks", r"compensation"],
    ),
    (
        SectionKind::Company,
        &[
            r"about\s+the\s+company",
            r"company\s+overview",
            r"about\s+us",
            r"who\s+we\s+are",
        ],
    ),
];

static RESUME_TABLE: Lazy<SectionTable> =
    Lazy::new(|| SectionTable::new(RESUME_HEADERS).expect("resume header patterns compile"));
static JOB_TABLE: Lazy<SectionTable> =
    Lazy::new(|| SectionTable::new(JOB_HEADERS).expect("job header patterns compile"));

/// Section kind -> ordered header regexes.
///
/// A header is a line that starts (after optional `#`, `*`, `-` or bullet
/// markers) with one of the phrases and is followed by a colon or the end of
/// the line. Text after a colon on the header line belongs to the section.
#[derive(Debug)]
pub struct SectionTable {
    rows: Vec<(SectionKind, Vec<Regex>)>,
}

impl SectionTable {
    pub fn new(rows: &[(SectionKind, &[&str])]) -> Result<Self, regex::Error> {
        let rows = rows
            .iter()
            .map(|(kind, phrases)| {
                let patterns = phrases
                    .iter()
                    .map(|phrase| {
                        Regex::new(&format!(
                            r"(?im)^[^\S\n]*(?:[#*•\-]+[^\S\n]*)?(?:{phrase})[^\S\n]*(?::|$)"
                        ))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((*kind, patterns))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rows })
    }

    pub fn resume() -> &'static SectionTable {
        &RESUME_TABLE
    }

    pub fn job() -> &'static SectionTable {
        &JOB_TABLE
    }
}

/// Sections in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    pub fn get(&self, kind: SectionKind) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == kind)
            .map(|s| s.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when no header matched; callers then scan the full text.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

struct HeaderHit {
    start: usize,
    end: usize,
    kind: SectionKind,
}

/// Split `text` into named sections using the header table.
pub fn segment(text: &str, table: &SectionTable) -> Sections {
    let mut hits: Vec<HeaderHit> = Vec::new();
    for (kind, patterns) in &table.rows {
        for pattern in patterns {
            hits.extend(pattern.find_iter(text).map(|m| HeaderHit {
                start: m.start(),
                end: m.end(),
                kind: *kind,
            }));
        }
    }

    // Several phrases can match the same header line; keep the longest.
    hits.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));
    hits.dedup_by(|later, earlier| later.start == earlier.start);

    let mut sections = Sections::default();
    for (i, hit) in hits.iter().enumerate() {
        let end = hits.get(i + 1).map(|next| next.start).unwrap_or(text.len());
        // A following header can start inside this header's trailing whitespace.
        let content = text.get(hit.end.min(end)..end).unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        match sections.sections.iter_mut().find(|s| s.name == hit.kind) {
            Some(existing) => {
                existing.text.push('\n');
                existing.text.push_str(content);
            }
            None => sections.sections.push(Section {
                name: hit.kind,
                text: content.to_string(),
            }),
        }
    }

    debug!(
        "Segmented {} chars into {} sections ({} header hits)",
        text.len(),
        sections.len(),
        hits.len()
    );
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe
jane@example.com

PROFESSIONAL EXPERIENCE

Senior Software Engineer | TechCorp | Jan 2020 - Present
- Led development of microservices using Python and Django

EDUCATION
Bachelor of Science in Computer Science
University of Technology | 2014 - 2018

Skills: Python, JavaScript, PostgreSQL
";

    const POSTING: &str = "Senior Backend Engineer

About us
We build payment infrastructure.

Responsibilities:
- Design APIs

Requirements:
- 5+ years of experience with Python

Preferred Qualifications
- Kubernetes

Benefits
- Remote work
";

    #[test]
    fn test_resume_sections() {
        let sections = segment(RESUME, SectionTable::resume());
        assert_eq!(sections.len(), 3);

        let experience = sections.get(SectionKind::Experience).unwrap();
        assert!(experience.starts_with("Senior Software Engineer"));
        assert!(experience.contains("Django"));
        assert!(!experience.contains("Bachelor"));

        let education = sections.get(SectionKind::Education).unwrap();
        assert!(education.contains("2014 - 2018"));

        assert_eq!(
            sections.get(SectionKind::Skills),
            Some("Python, JavaScript, PostgreSQL")
        );
    }

    #[test]
    fn test_sections_in_document_order() {
        let sections = segment(RESUME, SectionTable::resume());
        let names: Vec<SectionKind> = sections.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Skills
            ]
        );
    }

    #[test]
    fn test_job_sections() {
        let sections = segment(POSTING, SectionTable::job());
        assert_eq!(
            sections.get(SectionKind::Company),
            Some("We build payment infrastructure.")
        );
        assert_eq!(sections.get(SectionKind::Responsibilities), Some("- Design APIs"));
        assert_eq!(
            sections.get(SectionKind::Requirements),
            Some("- 5+ years of experience with Python")
        );
        assert_eq!(sections.get(SectionKind::Preferred), Some("- Kubernetes"));
        assert_eq!(sections.get(SectionKind::Benefits), Some("- Remote work"));
    }

    #[test]
    fn test_inline_mentions_are_not_headers() {
        let text = "Experience with Django is required.\nOur skills matrix is attached.";
        assert!(segment(text, SectionTable::resume()).is_empty());
    }

    #[test]
    fn test_no_headers_yields_empty_sections() {
        let sections = segment("just a paragraph of text", SectionTable::job());
        assert!(sections.is_empty());
        assert_eq!(sections.get(SectionKind::Requirements), None);
    }

    #[test]
    fn test_repeated_section_is_joined() {
        let text = "Experience\nFirst job\nEducation\nBSc\nExperience\nSecond job\n";
        let sections = segment(text, SectionTable::resume());
        assert_eq!(
            sections.get(SectionKind::Experience),
            Some("First job\nSecond job")
        );
    }

    #[test]
    fn test_markdown_and_crlf_headers() {
        let text = "## Work Experience\r\nAcme Corp\r\n* Skills\r\nRust\r\n";
        let sections = segment(text, SectionTable::resume());
        assert_eq!(sections.get(SectionKind::Experience), Some("Acme Corp"));
        assert_eq!(sections.get(SectionKind::Skills), Some("Rust"));
    }

    #[test]
    fn test_custom_table() {
        let rows: &[(SectionKind, &[&str])] = &[(SectionKind::Summary, &[r"tl;dr"])];
        let table = SectionTable::new(rows).unwrap();
        let sections = segment("TL;DR: ships fast\n", &table);
        assert_eq!(sections.get(SectionKind::Summary), Some("ships fast"));
    }
}
