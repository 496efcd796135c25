use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use super::lemmatizer::lemmatize;
use super::stopwords::is_stopword;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:http|www\.)\S+").unwrap());
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Form a token takes after [`TextNormalizer::preprocess_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenForm {
    /// Lowercased surface form.
    Surface,
    /// Dictionary base form.
    #[default]
    Lemma,
    /// Snowball stem.
    Stem,
}

/// Lossy text cleanup and tokenization shared by every extractor.
pub struct TextNormalizer {
    stemmer: Stemmer,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Lowercase, drop URLs, turn punctuation into spaces and collapse whitespace.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let lower = text.to_lowercase();
        let without_urls = URL_RE.replace_all(&lower, "");
        let without_punct = NON_WORD_RE.replace_all(&without_urls, " ");
        WHITESPACE_RE
            .replace_all(&without_punct, " ")
            .trim()
            .to_string()
    }

    /// Tokenize and drop stopwords, optionally reducing tokens to their lemma.
    pub fn preprocess(&self, text: &str, lemmatize: bool) -> Vec<String> {
        let form = if lemmatize {
            TokenForm::Lemma
        } else {
            TokenForm::Surface
        };
        self.preprocess_with(text, form)
    }

    pub fn preprocess_with(&self, text: &str, form: TokenForm) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let lower = text.to_lowercase();
        let without_urls = URL_RE.replace_all(&lower, "");
        let stripped: String = without_urls
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        stripped
            .split_whitespace()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .filter(|token| !is_stopword(token))
            .map(|token| match form {
                TokenForm::Surface => token.to_string(),
                TokenForm::Lemma => lemmatize(token),
                TokenForm::Stem => self.stemmer.stem(token).into_owned(),
            })
            .collect()
    }

    /// Split text into trimmed, non-empty sentences.
    pub fn sentences(&self, text: &str) -> Vec<String> {
        SENTENCE_END_RE
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
