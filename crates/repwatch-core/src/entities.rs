use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A monitored entity as declared in the seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl EntityConfig {
    /// Search terms used by collectors: the name first, then each keyword
    /// that is not a case-insensitive repeat of an earlier term.
    #[must_use]
    pub fn search_terms(&self) -> Vec<String> {
        search_terms(&self.name, &self.keywords)
    }
}

/// Build the de-duplicated search term list for an entity name and keywords.
#[must_use]
pub fn search_terms(name: &str, keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(name)
        .chain(keywords.iter().map(String::as_str))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct EntitiesFile {
    pub entities: Vec<EntityConfig>,
}

/// Load and validate the entities seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_entities(path: &Path) -> Result<EntitiesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::EntitiesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_entities(&content)
}

/// Parse and validate entities YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_entities(content: &str) -> Result<EntitiesFile, ConfigError> {
    let file: EntitiesFile = serde_yaml::from_str(content).map_err(ConfigError::EntitiesFileParse)?;
    validate_entities(&file)?;
    Ok(file)
}

fn validate_entities(file: &EntitiesFile) -> Result<(), ConfigError> {
    if file.entities.is_empty() {
        return Err(ConfigError::Validation(
            "entities list must not be empty".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    for entity in &file.entities {
        if entity.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "entity name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(entity.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate entity name: '{}'",
                entity.name
            )));
        }

        if entity.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "entity '{}' has a blank keyword",
                entity.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
entities:
  - name: OnePlus Nord
    keywords: [nord, oneplus]
    description: Mid-range phone line
  - name: Acme Bank
    is_active: false
";

    #[test]
    fn parses_entities_with_defaults() {
        let file = parse_entities(SAMPLE).expect("sample should parse");
        assert_eq!(file.entities.len(), 2);

        let nord = &file.entities[0];
        assert_eq!(nord.keywords, vec!["nord", "oneplus"]);
        assert!(nord.is_active);

        let bank = &file.entities[1];
        assert!(bank.keywords.is_empty());
        assert!(bank.description.is_none());
        assert!(!bank.is_active);
    }

    #[test]
    fn empty_list_is_rejected() {
        let result = parse_entities("entities: []\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let yaml = "entities:\n  - name: Acme\n  - name: ACME\n";
        let result = parse_entities(yaml);
        assert!(
            matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("duplicate")),
            "got: {result:?}"
        );
    }

    #[test]
    fn blank_keyword_is_rejected() {
        let yaml = "entities:\n  - name: Acme\n    keywords: ['  ']\n";
        assert!(matches!(
            parse_entities(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let result = parse_entities("entities: [name: {");
        assert!(matches!(result, Err(ConfigError::EntitiesFileParse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_entities(Path::new("/definitely/not/here/entities.yaml"));
        assert!(
            matches!(result, Err(ConfigError::EntitiesFileIo { ref path, .. }) if path.ends_with("entities.yaml")),
            "got: {result:?}"
        );
    }

    #[test]
    fn search_terms_start_with_name_and_skip_repeats() {
        let entity = EntityConfig {
            name: "OnePlus".to_string(),
            keywords: vec!["oneplus".to_string(), "Nord".to_string(), " ".to_string()],
            description: None,
            is_active: true,
        };
        assert_eq!(entity.search_terms(), vec!["OnePlus", "Nord"]);
    }

    #[test]
    fn shipped_entities_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("entities.yaml");
        let file = load_entities(&path).expect("config/entities.yaml should load");
        assert!(file.entities.iter().any(|e| e.is_active));
        assert!(file.entities.iter().any(|e| !e.is_active));
    }
}
