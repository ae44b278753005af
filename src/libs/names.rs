//! Species-name reconciliation.
//!
//! Tree labels and dataset names spell the same species differently
//! (`Homo_sapiens_ott770315`, `'Homo sapiens'`, `homo sapiens`). Matching is
//! done by expanding every name into a set of case and separator variants
//! and testing the sets for overlap. All functions here are pure.

use fxhash::FxHashSet;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_UNDERSCORES: Regex = Regex::new(r"_+").unwrap();
}

/// Variants of every allowed name. An empty set means "no restriction".
pub type AllowedSet = FxHashSet<String>;

const QUOTES: [char; 2] = ['\'', '"'];

/// Two-token `Genus_species` reduction of a label.
///
/// Leading underscores and quotes are stripped, whitespace counts as an
/// underscore, and only the first two non-empty tokens are kept.
///
/// ```
/// use phylodist::libs::names::canonical;
///
/// assert_eq!(canonical("_'Homo_sapiens_ott770315").as_deref(), Some("Homo_sapiens"));
/// assert_eq!(canonical("Felidae").as_deref(), Some("Felidae"));
/// assert_eq!(canonical("  "), None);
/// ```
pub fn canonical(name: &str) -> Option<String> {
    let stripped = name
        .trim()
        .trim_start_matches(|c: char| c == '_' || QUOTES.contains(&c))
        .trim_end_matches(QUOTES);
    let joined = RE_SPACES.replace_all(stripped, "_");

    let tokens: Vec<&str> = RE_UNDERSCORES
        .split(&joined)
        .filter(|t| !t.is_empty())
        .take(2)
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join("_"))
    }
}

/// Case and separator variants of one raw name, in a stable order.
/// Empty input gives an empty set.
pub fn variants(name: &str) -> IndexSet<String> {
    let mut set = IndexSet::new();
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return set;
    }

    push_spellings(&mut set, trimmed);
    if let Some(canon) = canonical(trimmed) {
        if canon != trimmed {
            push_spellings(&mut set, &canon);
        }
    }

    set
}

/// Case and separator variants of the name itself, without the
/// `Genus_species` reduction.
pub fn spellings(name: &str) -> IndexSet<String> {
    let mut set = IndexSet::new();
    let trimmed = name.trim();
    if !trimmed.is_empty() {
        push_spellings(&mut set, trimmed);
    }
    set
}

fn push_spellings(set: &mut IndexSet<String>, name: &str) {
    let underscored = RE_SPACES.replace_all(name, "_").into_owned();
    let spaced = RE_UNDERSCORES.replace_all(name, " ").into_owned();

    set.insert(name.to_string());
    set.insert(name.to_lowercase());
    set.insert(underscored.to_lowercase());
    set.insert(underscored);
    set.insert(spaced.to_lowercase());
    set.insert(spaced);
}

/// Union of the variants of all `names`.
pub fn allowed_set<I, S>(names: I) -> AllowedSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .flat_map(|name| variants(name.as_ref()))
        .collect()
}

/// Whether a tree label survives the allowed set.
pub fn is_allowed(label: Option<&str>, allowed: &AllowedSet) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match label {
        Some(label) => variants(label).iter().any(|v| allowed.contains(v)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_basic() {
        let v: Vec<_> = variants("  Homo sapiens ").into_iter().collect();
        assert_eq!(
            v,
            vec!["Homo sapiens", "homo sapiens", "homo_sapiens", "Homo_sapiens"]
        );
    }

    #[test]
    fn test_variants_with_canonical() {
        let v = variants("Panthera_leo_ott563151");
        assert!(v.contains("Panthera_leo_ott563151"));
        assert!(v.contains("panthera leo ott563151"));
        assert!(v.contains("Panthera_leo"));
        assert!(v.contains("panthera leo"));
        assert!(v.contains("Panthera leo"));
        // the raw spelling always comes first
        assert_eq!(v.get_index(0).map(String::as_str), Some("Panthera_leo_ott563151"));
    }

    #[test]
    fn test_spellings() {
        let v = spellings("Canis_lupus_familiaris");
        assert!(v.contains("canis lupus familiaris"));
        assert!(!v.contains("Canis_lupus"));
        assert!(spellings(" ").is_empty());
    }

    #[test]
    fn test_variants_empty() {
        assert!(variants("").is_empty());
        assert!(variants(" \t").is_empty());
    }

    #[test]
    fn test_variants_deterministic() {
        assert_eq!(variants("'Felis catus'"), variants("'Felis catus'"));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(canonical("Homo_sapiens").as_deref(), Some("Homo_sapiens"));
        assert_eq!(canonical("__Homo__sapiens__x").as_deref(), Some("Homo_sapiens"));
        assert_eq!(canonical("\"Canis lupus familiaris\"").as_deref(), Some("Canis_lupus"));
        assert_eq!(canonical("'Ursus'").as_deref(), Some("Ursus"));
        assert_eq!(canonical("___"), None);
        assert_eq!(canonical(""), None);
    }

    #[test]
    fn test_is_allowed() {
        let allowed = allowed_set(["Homo sapiens", "Pan troglodytes"]);

        assert!(is_allowed(Some("Homo_sapiens"), &allowed));
        assert!(is_allowed(Some("homo_sapiens_ott770315"), &allowed));
        assert!(is_allowed(Some("'Pan_troglodytes'"), &allowed));
        assert!(!is_allowed(Some("Gorilla_gorilla"), &allowed));
        assert!(!is_allowed(None, &allowed));

        let open = AllowedSet::default();
        assert!(is_allowed(Some("Gorilla_gorilla"), &open));
        assert!(is_allowed(None, &open));
    }
}
