use regex::Regex;
use std::collections::HashMap;

/// Single seam for entity identity. Every id comparison in normalization and
/// merge goes through [`IdentityResolver::canonical_id`], so a future
/// canonicalization or embedding-based matcher can replace naive string
/// equality without touching the merge logic.
///
/// The current rule is deliberately conservative: trim, collapse inner
/// whitespace, then exact match. No case folding — "Berlin" and "berlin"
/// stay distinct entities.
pub struct IdentityResolver {
    /// Maps cleaned id -> canonical id.
    aliases: HashMap<String, String>,
    whitespace: Regex,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self {
            aliases: HashMap::new(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Resolve a raw id to its canonical form, registering it on first sight.
    pub fn canonical_id(&mut self, raw: &str) -> String {
        let cleaned = self
            .whitespace
            .replace_all(raw.trim(), " ")
            .into_owned();

        if let Some(canonical) = self.aliases.get(&cleaned) {
            return canonical.clone();
        }

        // First sight of this id: the cleaned form becomes canonical.
        self.aliases.insert(cleaned.clone(), cleaned.clone());
        cleaned
    }

    /// Whether two raw ids resolve to the same entity.
    pub fn same_entity(&mut self, a: &str, b: &str) -> bool {
        self.canonical_id(a) == self.canonical_id(b)
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}
