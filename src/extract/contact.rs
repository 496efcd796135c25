use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z0-9.\-]{2,}").unwrap());

static PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // +1 (123) 456-7890
        r"\+\d{1,2}\s\(\d{3}\)\s\d{3}[-\s]?\d{4}",
        // (617)-372-4007
        r"\(\d{3}\)[-\s]?\d{3}[-\s]?\d{4}",
        // 123-456-7890
        r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static LINKEDIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:www\.)?linkedin\.com/in/[\w\-]+").unwrap());

static GITHUB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:www\.)?github\.com/[\w\-]+").unwrap());

static WEBSITE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)www\.[\w\-]+\.(?:com|dev|io|me|net|org)\b",
        r"(?i)\b[\w\-]+\.netlify\.app\b",
        r"(?i)\b[\w\-]+\.github\.io\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static NAME_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@|\d{3}|www|http|\bresume\b|\bcv\b|curriculum").unwrap());

static CAPITALIZED_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+(?:-[A-Z][a-z]+)?\s+[A-Z][a-z]+\b").unwrap());

const NAME_SCAN_LINES: usize = 5;
const NAME_MAX_CHARS: usize = 40;
const NAME_SCAN_CHARS: usize = 500;

/// Contact details found in a resume's header block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

impl ContactInfo {
    pub fn from_text(text: &str) -> Self {
        let info = Self {
            name: extract_name(text),
            email: extract_email(text),
            phone: extract_phone(text),
            linkedin: first_match(&LINKEDIN_RE, text),
            github: first_match(&GITHUB_RE, text),
            website: extract_website(text),
        };
        debug!(
            "Contact fields found: name={} email={} phone={} linkedin={} github={} website={}",
            info.name.is_some(),
            info.email.is_some(),
            info.phone.is_some(),
            info.linkedin.is_some(),
            info.github.is_some(),
            info.website.is_some()
        );
        info
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_string())
}

/// Academic addresses first, then Gmail, then whatever came first.
fn extract_email(text: &str) -> Option<String> {
    let emails: Vec<&str> = EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.'))
        .collect();

    emails
        .iter()
        .find(|e| e.to_lowercase().ends_with(".edu"))
        .or_else(|| emails.iter().find(|e| e.to_lowercase().ends_with("@gmail.com")))
        .or_else(|| emails.first())
        .map(|e| e.to_string())
}

fn extract_phone(text: &str) -> Option<String> {
    PHONE_RES
        .iter()
        .find_map(|re| first_match(re, text))
}

fn extract_website(text: &str) -> Option<String> {
    WEBSITE_RES.iter().find_map(|re| {
        re.find_iter(text)
            .map(|m| m.as_str())
            .find(|url| {
                let lower = url.to_lowercase();
                !lower.contains("linkedin.com") && !lower.contains("github.com")
            })
            .map(str::to_string)
    })
}

/// A short line near the top, else the first capitalized "First Last" pair.
fn extract_name(text: &str) -> Option<String> {
    let from_header = text
        .lines()
        .take(NAME_SCAN_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| {
            let words = line.split_whitespace().count();
            line.chars().count() < NAME_MAX_CHARS
                && (1..=3).contains(&words)
                && !NAME_NOISE_RE.is_match(line)
        })
        .map(str::to_string);

    from_header.or_else(|| {
        let head: String = text.chars().take(NAME_SCAN_CHARS).collect();
        first_match(&CAPITALIZED_NAME_RE, &head)
    })
}
