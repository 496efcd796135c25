use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

static DATE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s*(\d{4})\b|(present)\b)",
    )
    .unwrap()
});

static YEAR_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:19|20)\d{2})\s*(?:-|–|—|to|\s)\s*((?:19|20)\d{2}|present)\b").unwrap()
});

/// Larger stated figures are years of the calendar, not of experience.
const MAX_STATED_YEARS: f64 = 50.0;

static EXPERIENCE_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d+(?:\.\d+)?)\s*\+?\s*(?:(?:-|–|to|\s)\s*(\d+(?:\.\d+)?)\s*\+?\s*)?(?:years?|yrs?)\b(?:\s+of)?\s+(?:\w+\s+)?experience",
    )
    .unwrap()
});

/// Source of "today" for resolving open-ended ranges.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// How overlapping employment ranges are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Every range counts in full, concurrent jobs included.
    #[default]
    Additive,
    /// Overlapping ranges are merged before counting.
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateToken {
    Date(NaiveDate),
    Present,
}

/// A resolved employment span, both ends on the first of a month. `end` is
/// exclusive: a job held "Jan 2020 - Dec 2021" ends on 2022-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Whole months between `start` and `end`, never negative.
    pub fn months(&self) -> i64 {
        let months = (self.end.year() as i64 - self.start.year() as i64) * 12
            + (self.end.month() as i64 - self.start.month() as i64);
        months.max(0)
    }
}

/// Infers years of experience from an experience section.
pub struct DurationEstimator {
    clock: Arc<dyn Clock>,
    overlap: OverlapPolicy,
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), OverlapPolicy::default())
    }
}

impl DurationEstimator {
    pub fn new(clock: Arc<dyn Clock>, overlap: OverlapPolicy) -> Self {
        Self { clock, overlap }
    }

    /// Total years of experience, rounded to one decimal.
    ///
    /// Month/year ranges are preferred; then bare year ranges; then an
    /// explicit "N years of experience" phrase. Returns 0.0 when nothing is
    /// found.
    ///
    /// A named end month counts in full while `present` stops at the start of
    /// the current month: in Dec 2022 "Jan 2020 - Dec 2022" is 3.0 years but
    /// "Jan 2020 - Present" is 2.9.
    pub fn estimate_years(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();

        let mut ranges = self.month_ranges(&lower);
        if ranges.is_empty() {
            ranges = self.year_ranges(&lower);
        }

        if ranges.is_empty() {
            let stated = stated_years(&lower).unwrap_or(0.0);
            debug!("No date ranges found, stated experience: {}", stated);
            return stated;
        }

        let total_months = match self.overlap {
            OverlapPolicy::Additive => ranges.iter().map(DateRange::months).sum::<i64>(),
            OverlapPolicy::Union => merge_overlapping(ranges.clone())
                .iter()
                .map(DateRange::months)
                .sum::<i64>(),
        };

        let years = round1(total_months as f64 / 12.0);
        debug!(
            "Estimated {} years from {} ranges ({} months, {:?})",
            years,
            ranges.len(),
            total_months,
            self.overlap
        );
        years
    }

    /// `{month} {year}` / `present` tokens paired left to right. A named end
    /// month counts in full; `present` ends at the start of the current month.
    pub fn month_ranges(&self, lower: &str) -> Vec<DateRange> {
        let tokens = DATE_TOKEN_RE.captures_iter(lower).filter_map(|caps| {
            if caps.get(3).is_some() {
                return Some(DateToken::Present);
            }
            let month = month_number(caps.get(1)?.as_str())?;
            let year: i32 = caps.get(2)?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, 1).map(DateToken::Date)
        });
        self.pair(tokens, true)
    }

    /// `2014 - 2018` style ranges, each year counted from January.
    fn year_ranges(&self, lower: &str) -> Vec<DateRange> {
        let tokens = YEAR_RANGE_RE.captures_iter(lower).flat_map(|caps| {
            let start = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
                .map(DateToken::Date);
            let end = caps.get(2).and_then(|m| match m.as_str() {
                "present" => Some(DateToken::Present),
                year => year
                    .parse::<i32>()
                    .ok()
                    .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
                    .map(DateToken::Date),
            });
            match (start, end) {
                (Some(start), Some(end)) => vec![start, end],
                _ => Vec::new(),
            }
        });
        self.pair(tokens, false)
    }

    fn pair(&self, tokens: impl Iterator<Item = DateToken>, inclusive_end: bool) -> Vec<DateRange> {
        let now = first_of_month(self.clock.today());
        let mut ranges = Vec::new();
        let mut pending: Option<NaiveDate> = None;

        for token in tokens {
            match (pending.take(), token) {
                (None, DateToken::Date(date)) => pending = Some(date),
                (None, DateToken::Present) => {
                    debug!("Skipping 'present' with no start date");
                }
                (Some(start), DateToken::Date(end)) => {
                    let range = ordered(start, end);
                    ranges.push(if inclusive_end {
                        DateRange {
                            start: range.start,
                            end: next_month(range.end),
                        }
                    } else {
                        range
                    });
                }
                (Some(start), DateToken::Present) => ranges.push(ordered(start, now)),
            }
        }

        if let Some(start) = pending {
            debug!("Dropping unpaired start date {}", start);
        }
        ranges
    }
}

fn ordered(start: NaiveDate, end: NaiveDate) -> DateRange {
    if end < start {
        warn!("Date range ends before it starts ({} > {}), swapping", start, end);
        DateRange {
            start: end,
            end: start,
        }
    } else {
        DateRange { start, end }
    }
}

fn merge_overlapping(mut ranges: Vec<DateRange>) -> Vec<DateRange> {
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<DateRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                if range.end > last.end {
                    last.end = range.end;
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// "5+ years of experience" -> 5, "3-5 years of relevant experience" -> 4.
///
/// Normalized text turns "3-5" into "3 5", so a space also separates a range.
/// A pair that is not an ascending range of plausible figures ("since 2019
/// 5 years of experience") keeps only the number next to "years".
pub(crate) fn stated_years(lower: &str) -> Option<f64> {
    EXPERIENCE_PHRASE_RE.captures_iter(lower).find_map(|caps| {
        let first: f64 = caps.get(1)?.as_str().parse().ok()?;
        match caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok()) {
            Some(high) if high > MAX_STATED_YEARS => None,
            Some(high) if first < high => Some((first + high) / 2.0),
            Some(high) => Some(high),
            None if first <= MAX_STATED_YEARS => Some(first),
            None => None,
        }
    })
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
