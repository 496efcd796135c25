use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use tracing::debug;

// "5+ years", "3-5 years", "2 to 4 yrs", "minimum 7 years", "at least 1 year"
static REQUIRED_YEARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d+(?:\.\d+)?)\s*\+?\s*(?:(?:-|–|to)\s*(\d+(?:\.\d+)?)\s*\+?\s*)?(?:years?|yrs?)\b",
    )
    .unwrap()
});

static ENTRY_LEVEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:entry[- ]level|junior|no (?:prior )?experience required|recent graduates?)\b")
        .unwrap()
});

/// Reads the years of experience a job posting asks for.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementExtractor;

impl RequirementExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Median of every "N years" requirement in `text`.
    ///
    /// Ranges count as their midpoint. Without any figure, entry-level wording
    /// means `Some(0.0)`; otherwise the requirement is unspecified (`None`),
    /// which scoring treats differently from an explicit zero.
    pub fn required_years(&self, text: &str) -> Option<f64> {
        let lower = text.to_lowercase();

        let mut values: Vec<f64> = REQUIRED_YEARS_RE
            .captures_iter(&lower)
            .filter_map(|caps| {
                let low: f64 = caps.get(1)?.as_str().parse().ok()?;
                match caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok()) {
                    Some(high) => Some((low + high) / 2.0),
                    None => Some(low),
                }
            })
            .collect();

        if let Some(required) = median(&mut values) {
            debug!(
                "Required experience {} years (median of {} mentions)",
                required,
                values.len()
            );
            return Some(required);
        }

        if ENTRY_LEVEL_RE.is_match(&lower) {
            debug!("Entry-level posting, no experience required");
            return Some(0.0);
        }

        None
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
