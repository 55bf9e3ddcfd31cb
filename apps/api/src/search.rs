//! Site-wide help index backing `/sections` and `/api/search`.

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    pub title: &'static str,
    pub section: &'static str,
    pub content: &'static str,
    pub href: &'static str,
}

const fn entry(
    title: &'static str,
    section: &'static str,
    content: &'static str,
    href: &'static str,
) -> SearchEntry {
    SearchEntry {
        title,
        section,
        content,
        href,
    }
}

pub static INDEX: &[SearchEntry] = &[
    entry(
        "Create an account",
        "Getting started",
        "Register with your name, email and a password of at least eight characters.",
        "/register",
    ),
    entry(
        "Sign in",
        "Getting started",
        "Sign in with your email and password to reach your dashboard.",
        "/login",
    ),
    entry(
        "Upload your CV",
        "Building your site",
        "Upload a PDF, DOCX or plain-text CV. We extract your contact details, experience, education and skills.",
        "/upload",
    ),
    entry(
        "Choose a theme",
        "Building your site",
        "Pick Glassmorphism, Neumorphism, Minimal or Classic. Every theme renders the same CV data.",
        "/examples",
    ),
    entry(
        "Generate a summary",
        "Building your site",
        "Let the AI assistant draft a short professional summary from your parsed CV.",
        "/dashboard",
    ),
    entry(
        "Publish your website",
        "Publishing",
        "Publishing makes your site public at /sites/<domain> and stores a static export.",
        "/dashboard",
    ),
    entry(
        "Choose a domain",
        "Publishing",
        "Domains use lowercase letters, digits and hyphens, three to sixty-three characters long.",
        "/dashboard",
    ),
    entry(
        "Track views",
        "Analytics",
        "The dashboard shows how many websites you have, how many are published and their total views.",
        "/dashboard",
    ),
    entry(
        "Interview practice",
        "AI tools",
        "Submit an interview question and your answer to receive a score, strengths and improvements.",
        "/sections",
    ),
    entry(
        "Edit your profile",
        "Account",
        "Update your display name and avatar URL from the profile page.",
        "/profile",
    ),
    entry(
        "Sign out",
        "Account",
        "Signing out ends your session on this device.",
        "/",
    ),
];

/// Entries whose title, section or content contains `query`, ignoring case, in index order.
/// A blank or whitespace-only query matches everything; any other query is matched as given.
pub fn filter_entries<'a>(entries: &'a [SearchEntry], query: &str) -> Vec<&'a SearchEntry> {
    if query.trim().is_empty() {
        return entries.iter().collect();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            [e.title, e.section, e.content]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Groups entries by section, keeping first-appearance order.
pub fn group_by_section<'a>(
    entries: &[&'a SearchEntry],
) -> Vec<(&'static str, Vec<&'a SearchEntry>)> {
    let mut groups: Vec<(&'static str, Vec<&'a SearchEntry>)> = Vec::new();
    for &e in entries {
        match groups.iter_mut().find(|(section, _)| *section == e.section) {
            Some((_, items)) => items.push(e),
            None => groups.push((e.section, vec![e])),
        }
    }
    groups
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<&'static SearchEntry>,
}

/// GET /api/search?q=
pub async fn handle_search(Query(params): Query<SearchQuery>) -> Json<SearchResponse> {
    let results = filter_entries(INDEX, &params.q);
    Json(SearchResponse {
        query: params.q,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[SearchEntry] = &[
        entry("Alpha", "Intro", "first entry", "/a"),
        entry("Beta", "Usage", "mentions ALPHA in content", "/b"),
        entry("Gamma", "alpha section", "nothing", "/c"),
        entry("Delta", "Usage", "unrelated", "/d"),
    ];

    #[test]
    fn test_filter_matches_any_field_case_insensitively() {
        let titles: Vec<&str> = filter_entries(SAMPLE, "alpha").iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_filter_returns_only_matching_entries() {
        for query in ["usage", "DELTA", "entry", "zzz", "a"] {
            let needle = query.to_lowercase();
            let results = filter_entries(SAMPLE, query);
            for e in SAMPLE {
                let matches = e.title.to_lowercase().contains(&needle)
                    || e.section.to_lowercase().contains(&needle)
                    || e.content.to_lowercase().contains(&needle);
                assert_eq!(results.contains(&e), matches, "query {query:?} entry {}", e.title);
            }
        }
    }

    #[test]
    fn test_filter_preserves_index_order() {
        let results = filter_entries(SAMPLE, "u");
        let positions: Vec<usize> = results
            .iter()
            .map(|r| SAMPLE.iter().position(|e| e == *r).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_blank_query_returns_everything() {
        assert_eq!(filter_entries(SAMPLE, "").len(), SAMPLE.len());
        assert_eq!(filter_entries(SAMPLE, "   ").len(), SAMPLE.len());
    }

    #[test]
    fn test_surrounding_spaces_are_part_of_the_substring() {
        assert!(filter_entries(SAMPLE, "alpha ").is_empty());
        assert!(filter_entries(SAMPLE, "  beta ").is_empty());

        let titles: Vec<&str> = filter_entries(SAMPLE, "first ").iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Alpha"]);
        let titles: Vec<&str> = filter_entries(SAMPLE, " alpha").iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Beta"]);
    }

    #[test]
    fn test_group_by_section_keeps_first_appearance_order() {
        let all = filter_entries(SAMPLE, "");
        let groups = group_by_section(&all);
        let sections: Vec<&str> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(sections, vec!["Intro", "Usage", "alpha section"]);
        assert_eq!(groups[1].1.len(), 2);
    }

    #[test]
    fn test_real_index_is_searchable() {
        assert!(!filter_entries(INDEX, "domain").is_empty());
        assert_eq!(filter_entries(INDEX, "").len(), INDEX.len());
    }
}
