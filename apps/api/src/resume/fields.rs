//! Contact-detail extraction from raw CV text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::PersonalInfo;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

/// Candidate phone runs: optional `+`, digits with separators that stay on one line.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\(?\d[\d \t().-]{7,}\d").unwrap());

static LINKEDIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/([A-Za-z0-9_-]+)").unwrap()
});

static GITHUB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/([A-Za-z0-9-]{1,39})").unwrap());

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>'"\)\],]+"#).unwrap());

static STARTS_WITH_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d").unwrap());

const NAME_SCAN_LINES: usize = 15;
const NAME_BLOCKLIST: &[&str] = &[
    "curriculum vitae",
    "resume",
    "résumé",
    "cv",
    "contact",
    "profile",
    "summary",
    "experience",
    "education",
    "skills",
];

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_lowercase())
}

/// First run of 10–15 digits on a single line.
///
/// International numbers (leading `+`) must be valid for their country and
/// come back in E.164. Without a country code there is nothing to validate
/// against, so those are returned as bare digits.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE.find_iter(text).find_map(|m| {
        let raw = m.as_str().trim();
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if !(10..=15).contains(&digits.len()) {
            return None;
        }
        if raw.starts_with('+') {
            format_if_valid_phone(&format!("+{digits}"))
        } else {
            Some(digits)
        }
    })
}

fn format_if_valid_phone(input: &str) -> Option<String> {
    let parsed = phonenumber::parse(None, input).ok()?;
    if !phonenumber::is_valid(&parsed) {
        return None;
    }
    Some(parsed.format().mode(phonenumber::Mode::E164).to_string())
}

pub fn extract_linkedin(text: &str) -> Option<String> {
    LINKEDIN_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|handle| format!("https://www.linkedin.com/in/{}", handle.as_str()))
}

pub fn extract_github(text: &str) -> Option<String> {
    GITHUB_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|handle| format!("https://github.com/{}", handle.as_str()))
}

/// First http(s) URL that is not a LinkedIn or GitHub profile.
pub fn extract_website(text: &str) -> Option<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ';']))
        .find(|url| {
            let lower = url.to_ascii_lowercase();
            !lower.contains("linkedin.com") && !lower.contains("github.com")
        })
        .map(String::from)
}

/// A line of 2–4 capitalised words near the top, skipping contact lines and headings.
pub fn guess_name(text: &str) -> Option<String> {
    for raw in text.lines().take(NAME_SCAN_LINES) {
        let line = raw.trim().trim_matches(|c: char| c == '|' || c == '•').trim();
        if line.is_empty()
            || line.contains('@')
            || line.contains("://")
            || line.len() > 50
            || STARTS_WITH_DIGIT_RE.is_match(line)
        {
            continue;
        }
        if NAME_BLOCKLIST.contains(&line.to_lowercase().as_str()) {
            continue;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() < 2 || words.len() > 4 {
            continue;
        }

        let looks_like_name = words.iter().all(|w| {
            w.chars().next().is_some_and(char::is_uppercase)
                && w.chars().all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'))
        });
        if looks_like_name {
            return Some(line.to_string());
        }
    }
    None
}

pub fn extract_personal_info(text: &str) -> PersonalInfo {
    PersonalInfo {
        name: guess_name(text),
        email: extract_email(text),
        phone: extract_phone(text),
        linkedin: extract_linkedin(text),
        github: extract_github(text),
        website: extract_website(text),
        summary: None,
    }
}
