//! Website domain slugs: `[a-z0-9-]`, 3–63 chars, no hyphen at either end.

use rand::{distributions::Alphanumeric, Rng};

pub const MIN_LEN: usize = 3;
pub const MAX_LEN: usize = 63;
pub const SUFFIX_LEN: usize = 6;
const FALLBACK_SLUG: &str = "site";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    Length(usize),
    InvalidChar(char),
    EdgeHyphen,
}

impl DomainError {
    pub fn message(&self) -> String {
        match self {
            DomainError::Length(len) => {
                format!("Domain must be {MIN_LEN}-{MAX_LEN} characters long (got {len})")
            }
            DomainError::InvalidChar(c) => format!(
                "Domain may only contain lowercase letters, digits and hyphens (found '{c}')"
            ),
            DomainError::EdgeHyphen => "Domain cannot start or end with a hyphen".to_string(),
        }
    }
}

/// Trims and lower-cases `raw`, then checks it against the slug rules.
pub fn normalize_domain(raw: &str) -> Result<String, DomainError> {
    let domain = raw.trim().to_ascii_lowercase();
    let len = domain.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(DomainError::Length(len));
    }
    if let Some(c) = domain
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(DomainError::InvalidChar(c));
    }
    if domain.starts_with('-') || domain.ends_with('-') {
        return Err(DomainError::EdgeHyphen);
    }
    Ok(domain)
}

/// Lower-case ASCII slug with runs of other characters collapsed to one hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// `<slug>-<suffix>` built from a name or title; always passes [`normalize_domain`].
pub fn derive_domain(source: &str) -> String {
    let mut base = slugify(source);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }
    base.truncate(MAX_LEN - SUFFIX_LEN - 1);
    let base = base.trim_end_matches('-');
    format!("{base}-{}", random_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepts_valid_slugs() {
        assert_eq!(normalize_domain("ada-lovelace").unwrap(), "ada-lovelace");
        assert_eq!(normalize_domain("  Ada-2024 ").unwrap(), "ada-2024");
        assert_eq!(normalize_domain("abc").unwrap(), "abc");
        assert!(normalize_domain(&"a".repeat(MAX_LEN)).is_ok());
    }

    #[test]
    fn test_normalize_rejects_bad_length() {
        assert_eq!(normalize_domain("ab"), Err(DomainError::Length(2)));
        assert_eq!(
            normalize_domain(&"a".repeat(MAX_LEN + 1)),
            Err(DomainError::Length(MAX_LEN + 1))
        );
    }

    #[test]
    fn test_normalize_rejects_bad_chars_and_edges() {
        assert_eq!(normalize_domain("ada_l"), Err(DomainError::InvalidChar('_')));
        assert_eq!(normalize_domain("ada.dev"), Err(DomainError::InvalidChar('.')));
        assert_eq!(normalize_domain("-ada"), Err(DomainError::EdgeHyphen));
        assert_eq!(normalize_domain("ada-"), Err(DomainError::EdgeHyphen));
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Ada  Lovelace!"), "ada-lovelace");
        assert_eq!(slugify("  --Grace__Hopper--  "), "grace-hopper");
        assert_eq!(slugify("José Núñez"), "jos-n-ez");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_derive_domain_is_always_valid() {
        for source in ["Ada Lovelace", "", "¡¡¡", &"Very Long Name ".repeat(10)] {
            let domain = derive_domain(source);
            assert_eq!(normalize_domain(&domain).as_deref(), Ok(domain.as_str()));
        }
        assert!(derive_domain("Ada Lovelace").starts_with("ada-lovelace-"));
        assert!(derive_domain("").starts_with("site-"));
    }
}
