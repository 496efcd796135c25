use std::collections::BTreeSet;
use tracing::debug;

use super::SkillTaxonomy;

impl SkillTaxonomy {
    /// Extract canonical skill names from free text.
    ///
    /// Every lexicon term is matched case-insensitively on word boundaries,
    /// longest term first. A matched span is blanked out so shorter terms
    /// cannot match inside it ("machine learning" never also yields
    /// "learning"). Aliases resolve to their canonical name.
    pub fn extract_skills(&self, text: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        if text.trim().is_empty() {
            return found;
        }

        let mut haystack = text.to_lowercase();

        for term in &self.terms {
            let spans = find_bounded(&haystack, term);
            if spans.is_empty() {
                continue;
            }
            found.insert(self.resolve_term(term));
            for (start, end) in spans {
                haystack.replace_range(start..end, &" ".repeat(end - start));
            }
        }

        debug!(
            "Extracted {} skills from text ({} chars)",
            found.len(),
            text.len()
        );
        found
    }
}

/// Byte spans of `term` in `haystack` that sit on word boundaries.
fn find_bounded(haystack: &str, term: &str) -> Vec<(usize, usize)> {
    haystack
        .match_indices(term)
        .map(|(start, matched)| (start, start + matched.len()))
        .filter(|&(start, end)| {
            let before = haystack[..start].chars().next_back();
            let after = haystack[end..].chars().next();
            !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> SkillTaxonomy {
        SkillTaxonomy::bundled().unwrap()
    }

    fn has(skills: &BTreeSet<String>, name: &str) -> bool {
        skills.contains(name)
    }

    #[test]
    fn test_extract_programming_languages() {
        let text = "I am proficient in Python, JavaScript, and Rust. I also know some Go.";
        let skills = taxonomy().extract_skills(text);

        assert!(has(&skills, "python"));
        assert!(has(&skills, "javascript"));
        assert!(has(&skills, "rust"));
        assert!(has(&skills, "go"));
    }

    #[test]
    fn test_extract_frameworks() {
        let text = "Experience with React, Django, and FastAPI. Built apps using Next.js";
        let skills = taxonomy().extract_skills(text);

        assert!(has(&skills, "react"));
        assert!(has(&skills, "django"));
        assert!(has(&skills, "fastapi"));
        assert!(has(&skills, "next.js"));
    }

    #[test]
    fn test_extract_tools() {
        let text = "Used Docker and Kubernetes for deployment. AWS and PostgreSQL for infrastructure.";
        let skills = taxonomy().extract_skills(text);

        assert!(has(&skills, "docker"));
        assert!(has(&skills, "kubernetes"));
        assert!(has(&skills, "aws"));
        assert!(has(&skills, "postgresql"));
    }

    #[test]
    fn test_extract_soft_skills() {
        let text = "Strong leadership and communication skills. Experience with agile methodologies.";
        let skills = taxonomy().extract_skills(text);

        assert!(has(&skills, "leadership"));
        assert!(has(&skills, "communication"));
        assert!(has(&skills, "agile"));
    }

    #[test]
    fn test_verbatim_entries_found() {
        let skills = taxonomy().extract_skills("5 years with Python and Django");
        assert!(has(&skills, "python"));
        assert!(has(&skills, "django"));
    }

    #[test]
    fn test_alias_resolves_to_canonical() {
        let skills = taxonomy().extract_skills("Frontend work in JS and TS, deployed on k8s");
        assert!(has(&skills, "javascript"));
        assert!(has(&skills, "typescript"));
        assert!(has(&skills, "kubernetes"));
        assert!(!has(&skills, "js"));
        assert!(!has(&skills, "ts"));
        assert!(!has(&skills, "k8s"));
    }

    #[test]
    fn test_word_boundaries_required() {
        // "java" inside "javascript", "go" inside "going", "sql" inside "mysql"
        let skills = taxonomy().extract_skills("Going forward we use JavaScript and MySQL");
        assert!(has(&skills, "javascript"));
        assert!(has(&skills, "mysql"));
        assert!(!has(&skills, "java"));
        assert!(!has(&skills, "go"));
        assert!(!has(&skills, "sql"));
    }

    #[test]
    fn test_longer_terms_shadow_substrings() {
        let skills = taxonomy().extract_skills("Built services with Spring Boot on Apache Kafka");
        assert!(has(&skills, "spring boot"));
        assert!(has(&skills, "kafka"));
        assert!(!has(&skills, "spring"));
        assert!(!has(&skills, "apache"));
    }

    #[test]
    fn test_punctuated_terms() {
        let skills = taxonomy().extract_skills("C++, C# and Node.js; CI/CD with GitHub Actions.");
        assert!(has(&skills, "c++"));
        assert!(has(&skills, "c#"));
        assert!(has(&skills, "node.js"));
        assert!(has(&skills, "ci/cd"));
        assert!(has(&skills, "github actions"));
        assert!(!has(&skills, "github"));
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let skills = taxonomy().extract_skills("pythonic code, djangoesque views, kubernets");
        assert!(skills.is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(taxonomy().extract_skills("").is_empty());
        assert!(taxonomy().extract_skills("   \n").is_empty());
    }
}
