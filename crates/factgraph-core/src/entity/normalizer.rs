//! Entity name normalization.
//!
//! Lowercase, drop possessive and apostrophe markers, collapse whitespace.
//! The identifier is a UUID v5 over the normalized bytes, so it is stable
//! across processes and never depends on ingestion order.

use uuid::Uuid;

use super::{CanonicalEntity, EntityId};

/// Canonicalize a raw mention into its normalized name and identifier.
pub fn normalize(raw: &str) -> CanonicalEntity {
    let normalized_name = normalize_name(raw);
    let id = entity_id(&normalized_name);
    CanonicalEntity {
        normalized_name,
        id,
    }
}

/// Normalized form of a free-text name.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut words: Vec<String> = Vec::new();
    for word in lowered.split_whitespace() {
        let stripped = strip_apostrophes(word);
        if !stripped.is_empty() {
            words.push(stripped);
        }
    }
    words.join(" ")
}

/// Predicates share the text normalization but carry no identity of their own.
pub fn normalize_predicate(raw: &str) -> String {
    normalize_name(raw)
}

/// Identifier for an already-normalized name.
pub fn entity_id(normalized_name: &str) -> EntityId {
    EntityId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, normalized_name.as_bytes()))
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{02BC}' | '`')
}

/// "john's" → "john", "o'brien" → "obrien", "students'" → "students".
fn strip_apostrophes(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut end = chars.len();
    if end >= 2 && chars[end - 1] == 's' && is_apostrophe(chars[end - 2]) {
        end -= 2;
    }
    chars[..end].iter().filter(|c| !is_apostrophe(**c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_possessive_variants_collapse() {
        let plain = normalize("John Smith");
        assert_eq!(plain.normalized_name, "john smith");
        assert_eq!(normalize("JOHN SMITH").id, plain.id);
        assert_eq!(normalize("John's Smith").id, plain.id);
        assert_eq!(normalize("  john   smith \t").id, plain.id);
    }

    #[test]
    fn curly_apostrophes_are_markers_too() {
        assert_eq!(normalize_name("TechCorp\u{2019}s"), "techcorp");
        assert_eq!(normalize_name("O\u{2019}Brien"), "obrien");
    }

    #[test]
    fn inner_apostrophes_are_removed() {
        assert_eq!(normalize_name("O'Brien"), "obrien");
        assert_eq!(normalize_name("rock 'n' roll"), "rock n roll");
    }

    #[test]
    fn plural_possessive_keeps_the_s() {
        assert_eq!(normalize_name("the students' union"), "the students union");
    }

    #[test]
    fn lone_possessive_token_disappears() {
        assert_eq!(normalize_name("John 's car"), "john car");
    }

    #[test]
    fn different_names_differ() {
        assert_ne!(normalize("John Smith").id, normalize("Jane Smith").id);
    }

    #[test]
    fn identifier_is_stable_uuid_v5() {
        let id = entity_id("john smith");
        assert_eq!(id.as_uuid().get_version_num(), 5);
        assert_eq!(
            id,
            EntityId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, b"john smith"))
        );
    }

    #[test]
    fn empty_and_blank_normalize_to_empty() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
        assert_eq!(normalize_name("'s"), "");
    }
}
