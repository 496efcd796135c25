use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::error::TaxonomyError;

const BUNDLED_TAXONOMY: &str = include_str!("../../data/skills_taxonomy.json");

/// A canonical skill and the names it is also known by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillEntry {
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub aliases: Vec<String>,
}

/// Dataset layout: category -> subcategory -> skills. A skill is either a
/// bare name or an object carrying aliases.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSkill {
    Name(String),
    Entry {
        name: String,
        #[serde(default)]
        aliases: Vec<String>,
    },
}

type RawTaxonomy = BTreeMap<String, BTreeMap<String, Vec<RawSkill>>>;

/// Immutable skill lexicon. Built once at startup and shared by reference
/// (`Arc<SkillTaxonomy>`) between extractors and scorers.
#[derive(Debug)]
pub struct SkillTaxonomy {
    /// canonical name -> entry
    entries: BTreeMap<String, SkillEntry>,
    /// alias -> canonical name
    aliases: HashMap<String, String>,
    /// Every matchable term (canonical names and aliases), longest first.
    pub(super) terms: Vec<String>,
}

impl SkillTaxonomy {
    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self, TaxonomyError> {
        Self::from_json_str(BUNDLED_TAXONOMY)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load from `path` when given, otherwise use the bundled dataset.
    pub fn load(path: Option<&str>) -> Result<Self, TaxonomyError> {
        let taxonomy = match path {
            Some(path) => {
                info!("Loading skill taxonomy from {}", path);
                Self::from_path(path)?
            }
            None => Self::bundled()?,
        };
        info!(
            "Skill taxonomy ready ({} skills, {} aliases)",
            taxonomy.len(),
            taxonomy.aliases.len()
        );
        Ok(taxonomy)
    }

    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let raw: RawTaxonomy = serde_json::from_str(json)?;

        let mut entries: BTreeMap<String, SkillEntry> = BTreeMap::new();
        let mut aliases: HashMap<String, String> = HashMap::new();

        for (category, subcategories) in raw {
            for (subcategory, skills) in subcategories {
                for skill in skills {
                    let (name, raw_aliases) = match skill {
                        RawSkill::Name(name) => (name, Vec::new()),
                        RawSkill::Entry { name, aliases } => (name, aliases),
                    };

                    let name = clean(&name);
                    if name.is_empty() {
                        return Err(TaxonomyError::EmptyName {
                            category: category.clone(),
                            subcategory: subcategory.clone(),
                        });
                    }
                    if entries.contains_key(&name) {
                        return Err(TaxonomyError::DuplicateCanonical(name));
                    }

                    let mut entry_aliases = Vec::new();
                    for alias in raw_aliases.iter().map(|a| clean(a)) {
                        if alias.is_empty() || alias == name {
                            continue;
                        }
                        if let Some(existing) = aliases.get(&alias) {
                            if existing != &name {
                                return Err(TaxonomyError::AmbiguousAlias {
                                    alias,
                                    first: existing.clone(),
                                    second: name,
                                });
                            }
                            continue;
                        }
                        aliases.insert(alias.clone(), name.clone());
                        entry_aliases.push(alias);
                    }

                    entries.insert(
                        name.clone(),
                        SkillEntry {
                            name,
                            category: category.clone(),
                            subcategory: subcategory.clone(),
                            aliases: entry_aliases,
                        },
                    );
                }
            }
        }

        if entries.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        // An alias must never shadow another skill's canonical name.
        for (alias, canonical) in &aliases {
            if entries.contains_key(alias) {
                return Err(TaxonomyError::AmbiguousAlias {
                    alias: alias.clone(),
                    first: alias.clone(),
                    second: canonical.clone(),
                });
            }
        }

        let mut terms: Vec<String> = entries
            .keys()
            .cloned()
            .chain(aliases.keys().cloned())
            .collect();
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        debug!(
            "Built taxonomy with {} canonical skills and {} matchable terms",
            entries.len(),
            terms.len()
        );

        Ok(Self {
            entries,
            aliases,
            terms,
        })
    }

    /// Resolve an alias to its canonical name. Names the taxonomy does not know
    /// are returned lowercased and trimmed.
    pub fn canonicalize(&self, name: &str) -> String {
        let name = clean(name);
        match self.aliases.get(&name) {
            Some(canonical) => canonical.clone(),
            None => name,
        }
    }

    pub fn canonicalize_all<'a, I>(&self, names: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .map(|name| self.canonicalize(name))
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub(super) fn resolve_term(&self, term: &str) -> String {
        self.aliases
            .get(term)
            .cloned()
            .unwrap_or_else(|| term.to_string())
    }

    pub fn entry(&self, canonical: &str) -> Option<&SkillEntry> {
        self.entries.get(canonical)
    }

    /// `(category, subcategory)` of a canonical name or alias.
    pub fn category_of(&self, name: &str) -> Option<(&str, &str)> {
        self.entry(&self.canonicalize(name))
            .map(|e| (e.category.as_str(), e.subcategory.as_str()))
    }

    /// Group skills by category; unknown skills land under `"other"`.
    pub fn group_by_category<'a, I>(&self, skills: I) -> BTreeMap<String, Vec<String>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for skill in skills {
            let category = self
                .category_of(skill)
                .map(|(category, _)| category.to_string())
                .unwrap_or_else(|| "other".to_string());
            grouped.entry(category).or_default().push(skill.clone());
        }
        for names in grouped.values_mut() {
            names.sort();
        }
        grouped
    }

    /// One slot per canonical skill in name order, 1 where `skills` names it.
    pub fn skill_vector<'a, I>(&self, skills: I) -> Vec<u8>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let present = self.canonicalize_all(skills);
        self.entries
            .keys()
            .map(|name| u8::from(present.contains(name)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clean(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL: &str = r#"{
        "programming": {
            "languages": [
                "python",
                {"name": "JavaScript", "aliases": ["JS", "ecmascript"]}
            ]
        },
        "frameworks": {
            "backend": ["django"]
        }
    }"#;

    #[test]
    fn test_bundled_taxonomy_loads() {
        let taxonomy = SkillTaxonomy::bundled().unwrap();
        assert!(taxonomy.len() > 100);
        assert!(taxonomy.entry("python").is_some());
        assert_eq!(taxonomy.canonicalize("k8s"), "kubernetes");
    }

    #[test]
    fn test_names_and_aliases_are_lowercased() {
        let taxonomy = SkillTaxonomy::from_json_str(SMALL).unwrap();
        let entry = taxonomy.entry("javascript").unwrap();
        assert_eq!(entry.category, "programming");
        assert_eq!(entry.subcategory, "languages");
        assert_eq!(entry.aliases, vec!["js", "ecmascript"]);
        assert_eq!(taxonomy.canonicalize(" JS "), "javascript");
        assert_eq!(taxonomy.canonicalize("Haskell"), "haskell");
    }

    #[test]
    fn test_terms_are_longest_first() {
        let taxonomy = SkillTaxonomy::from_json_str(SMALL).unwrap();
        let lengths: Vec<usize> = taxonomy.terms.iter().map(|t| t.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
        // equal lengths fall back to alphabetical order
        assert_eq!(taxonomy.terms[0], "ecmascript");
        assert_eq!(taxonomy.terms[1], "javascript");
    }

    #[test]
    fn test_duplicate_canonical_rejected() {
        let json = r#"{"a": {"b": ["python", "Python"]}}"#;
        assert!(matches!(
            SkillTaxonomy::from_json_str(json),
            Err(TaxonomyError::DuplicateCanonical(name)) if name == "python"
        ));
    }

    #[test]
    fn test_alias_shared_between_skills_rejected() {
        let json = r#"{"a": {"b": [
            {"name": "javascript", "aliases": ["js"]},
            {"name": "java", "aliases": ["js"]}
        ]}}"#;
        assert!(matches!(
            SkillTaxonomy::from_json_str(json),
            Err(TaxonomyError::AmbiguousAlias { .. })
        ));
    }

    #[test]
    fn test_alias_shadowing_canonical_rejected() {
        let json = r#"{"a": {"b": [
            {"name": "postgresql", "aliases": ["sql"]},
            "sql"
        ]}}"#;
        assert!(matches!(
            SkillTaxonomy::from_json_str(json),
            Err(TaxonomyError::AmbiguousAlias { .. })
        ));
    }

    #[test]
    fn test_corrupt_and_empty_datasets_fail() {
        assert!(matches!(
            SkillTaxonomy::from_json_str("{not json"),
            Err(TaxonomyError::Parse(_))
        ));
        assert!(matches!(
            SkillTaxonomy::from_json_str("{}"),
            Err(TaxonomyError::Empty)
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = SkillTaxonomy::from_path("/nonexistent/skills.json").unwrap_err();
        assert!(matches!(err, TaxonomyError::Io { .. }));
        assert!(err.to_string().contains("skills.json"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();

        let taxonomy = SkillTaxonomy::load(file.path().to_str()).unwrap();
        assert_eq!(taxonomy.len(), 3);
    }

    #[test]
    fn test_group_by_category() {
        let taxonomy = SkillTaxonomy::from_json_str(SMALL).unwrap();
        let skills = vec![
            "python".to_string(),
            "django".to_string(),
            "cobol".to_string(),
        ];
        let grouped = taxonomy.group_by_category(&skills);
        assert_eq!(grouped["programming"], vec!["python"]);
        assert_eq!(grouped["frameworks"], vec!["django"]);
        assert_eq!(grouped["other"], vec!["cobol"]);
    }

    #[test]
    fn test_skill_vector_follows_name_order() {
        let taxonomy = SkillTaxonomy::from_json_str(SMALL).unwrap();
        let skills = vec!["JS".to_string(), "python".to_string(), "cobol".to_string()];
        // django, javascript, python
        assert_eq!(taxonomy.skill_vector(&skills), vec![0, 1, 1]);
        assert_eq!(taxonomy.skill_vector(&Vec::<String>::new()), vec![0, 0, 0]);
    }
}
