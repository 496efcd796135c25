use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Irregular plurals mapped to their dictionary form.
static IRREGULAR_NOUNS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("analyses", "analysis"),
        ("diagnoses", "diagnosis"),
        ("hypotheses", "hypothesis"),
        ("theses", "thesis"),
        ("crises", "crisis"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("vertices", "vertex"),
        ("appendices", "appendix"),
        ("leaves", "leaf"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("halves", "half"),
        ("selves", "self"),
        ("shelves", "shelf"),
    ]
    .into_iter()
    .collect()
});

/// Words that end in `s` but are already a base form.
static PROTECTED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "kubernetes", "aws", "devops", "finops", "mlops", "analytics", "statistics",
        "mathematics", "physics", "economics", "ethics", "logistics", "graphics",
        "robotics", "genomics", "electronics", "news", "series", "species", "jenkins",
        "pandas", "redis", "ios", "macos", "postgres", "windows", "sales", "elasticsearch",
        "express", "nodejs", "nextjs", "vuejs", "reactjs", "js", "ts", "css", "sass", "saas",
        "paas", "iaas", "gcs", "ecs", "eks", "rds", "sns", "sqs", "kms", "dns", "https",
        "ops", "chaos", "canvas", "atlas", "alias", "bias", "corpus", "versus",
    ]
    .into_iter()
    .collect()
});

/// Base forms ending in `-che`, which the `-ches` rule would otherwise truncate.
static CHE_STEMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["cache", "niche", "ache", "headache", "avalanche", "microfiche", "moustache"]
        .into_iter()
        .collect()
});

/// Reduce a lowercase token to its dictionary (noun) base form.
///
/// Irregular plurals come from a fixed table; regular plurals are handled by
/// suffix rules guarded by a protected-word list. Tokens that are not
/// recognisably plural are returned unchanged.
pub fn lemmatize(token: &str) -> String {
    if let Some(base) = IRREGULAR_NOUNS.get(token) {
        return (*base).to_string();
    }
    if token.len() <= 3 || PROTECTED.contains(token) || !token.ends_with('s') {
        return token.to_string();
    }
    if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
        return token.to_string();
    }
    if !token.chars().all(|c| c.is_alphabetic()) {
        return token.to_string();
    }

    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = token.strip_suffix("ses") {
        // processes -> process, but databases -> database
        if stem.ends_with('s') {
            return format!("{stem}s");
        }
    }
    if let Some(stem) = token.strip_suffix("xes") {
        return format!("{stem}x");
    }
    for suffix in ["ches", "shes"] {
        if let Some(stem) = token.strip_suffix(suffix) {
            let singular = &token[..token.len() - 1];
            if CHE_STEMS.contains(singular) {
                return singular.to_string();
            }
            return format!("{stem}{}", &suffix[..suffix.len() - 2]);
        }
    }

    token[..token.len() - 1].to_string()
}
