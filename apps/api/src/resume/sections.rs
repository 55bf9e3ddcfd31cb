//! Heading-based section splitting and per-section entry parsing.
//!
//! CV layouts vary wildly; everything here is heuristic and errs on the side
//! of keeping text (as a highlight or detail line) rather than dropping it.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::{EducationItem, ExperienceItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Other,
}

const HEADINGS: &[(&str, SectionKind)] = &[
    ("summary", SectionKind::Summary),
    ("professional summary", SectionKind::Summary),
    ("profile", SectionKind::Summary),
    ("professional profile", SectionKind::Summary),
    ("about", SectionKind::Summary),
    ("about me", SectionKind::Summary),
    ("objective", SectionKind::Summary),
    ("career objective", SectionKind::Summary),
    ("experience", SectionKind::Experience),
    ("work experience", SectionKind::Experience),
    ("professional experience", SectionKind::Experience),
    ("relevant experience", SectionKind::Experience),
    ("employment", SectionKind::Experience),
    ("employment history", SectionKind::Experience),
    ("work history", SectionKind::Experience),
    ("career history", SectionKind::Experience),
    ("education", SectionKind::Education),
    ("education and training", SectionKind::Education),
    ("academic background", SectionKind::Education),
    ("qualifications", SectionKind::Education),
    ("skills", SectionKind::Skills),
    ("technical skills", SectionKind::Skills),
    ("key skills", SectionKind::Skills),
    ("core competencies", SectionKind::Skills),
    ("competencies", SectionKind::Skills),
    ("technologies", SectionKind::Skills),
    ("skills and tools", SectionKind::Skills),
    ("projects", SectionKind::Projects),
    ("personal projects", SectionKind::Projects),
    ("selected projects", SectionKind::Projects),
    ("certifications", SectionKind::Other),
    ("awards", SectionKind::Other),
    ("languages", SectionKind::Other),
    ("interests", SectionKind::Other),
    ("hobbies", SectionKind::Other),
    ("publications", SectionKind::Other),
    ("references", SectionKind::Other),
    ("volunteering", SectionKind::Other),
];

const MAX_HEADING_WORDS: usize = 4;
const MAX_SKILL_LEN: usize = 60;
const BULLETS: &[char] = &['•', '▪', '◦', '‣', '·', '●', '*', '-', '–'];

const MONTH: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{4}";

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    let point = format!(r"{MONTH}|\d{{1,2}}/\d{{4}}|\d{{4}}");
    Regex::new(&format!(
        r"(?i)\b({point})\s*(?:-|–|—|to|until)\s*({point}|present|current|now|today)\b"
    ))
    .unwrap()
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

static DEGREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:bachelor'?s?|master'?s?|ph\.?\s?d|mba|diploma|associate|doctorate|b\.?sc|m\.?sc|b\.?eng|m\.?eng|b\.?tech|m\.?tech)\b|\b[bm]\.[as]\.",
    )
    .unwrap()
});

static INSTITUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:university|universit[éeä]|college|institute|school|academy|polytechnic)\b")
        .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Raw lines, blank lines included as empty strings.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Lines grouped into one entry: header lines, an optional date range and bullet points.
#[derive(Debug, Clone, Default)]
struct RawEntry {
    header: Vec<String>,
    dates: Option<DateRange>,
    bullets: Vec<String>,
}

pub fn heading_kind(line: &str) -> Option<SectionKind> {
    let cleaned = line.trim().trim_end_matches(':').trim();
    if cleaned.is_empty() || cleaned.split_whitespace().count() > MAX_HEADING_WORDS {
        return None;
    }
    let normalized = cleaned
        .to_lowercase()
        .replace('&', "and")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    HEADINGS
        .iter()
        .find(|(heading, _)| *heading == normalized)
        .map(|(_, kind)| *kind)
}

/// Splits text at recognised headings. Lines before the first heading form the preamble.
pub fn split_sections(text: &str) -> (Vec<String>, Vec<Section>) {
    let mut preamble = Vec::new();
    let mut sections: Vec<Section> = Vec::new();

    for line in text.lines() {
        if let Some(kind) = heading_kind(line) {
            sections.push(Section {
                kind,
                lines: Vec::new(),
            });
            continue;
        }
        match sections.last_mut() {
            Some(section) => section.lines.push(line.to_string()),
            None => preamble.push(line.to_string()),
        }
    }

    (preamble, sections)
}

pub fn strip_bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(BULLETS)?.trim();
    (!rest.is_empty()).then_some(rest)
}

fn trim_separators(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '|' | '-' | '–' | '—' | '(' | ')'))
        .to_string()
}

fn normalize_end(end: &str) -> String {
    match end.to_lowercase().as_str() {
        "present" | "current" | "now" | "today" => "Present".to_string(),
        _ => end.to_string(),
    }
}

/// Finds a date range and returns it with the rest of the line.
pub fn find_date_range(line: &str) -> Option<(DateRange, String)> {
    let caps = DATE_RANGE_RE.captures(line)?;
    let whole = caps.get(0)?;
    let range = DateRange {
        start: caps.get(1)?.as_str().to_string(),
        end: normalize_end(caps.get(2)?.as_str()),
    };
    let rest = format!("{} {}", &line[..whole.start()], &line[whole.end()..]);
    Some((range, trim_separators(&rest)))
}

fn take_single_year(line: &str) -> (Option<String>, String) {
    match YEAR_RE.find(line) {
        Some(m) => {
            let rest = format!("{} {}", &line[..m.start()], &line[m.end()..]);
            (Some(m.as_str().to_string()), trim_separators(&rest))
        }
        None => (None, line.to_string()),
    }
}

/// Splits "A at B", "A | B", "A - B", "A, B" into a pair.
fn split_pair(text: &str) -> Option<(String, String)> {
    for sep in [" at ", " @ ", " | ", " — ", " – ", " - ", ", "] {
        if let Some((a, b)) = text.split_once(sep) {
            let (a, b) = (a.trim(), b.trim());
            if !a.is_empty() && !b.is_empty() {
                return Some((a.to_string(), b.to_string()));
            }
        }
    }
    None
}

fn group_entries(lines: &[String]) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            entries.extend(current.take());
            continue;
        }
        if let Some(bullet) = strip_bullet(line) {
            current
                .get_or_insert_with(RawEntry::default)
                .bullets
                .push(bullet.to_string());
            continue;
        }

        let (dates, rest) = match find_date_range(line) {
            Some((range, rest)) => (Some(range), rest),
            None => (None, line.to_string()),
        };
        let starts_new = match &current {
            None => true,
            Some(entry) => {
                !entry.bullets.is_empty() || (dates.is_some() && entry.dates.is_some())
            }
        };
        if starts_new {
            entries.extend(current.take());
        }
        let entry = current.get_or_insert_with(RawEntry::default);
        if dates.is_some() {
            entry.dates = dates;
        }
        if !rest.is_empty() {
            entry.header.push(rest);
        }
    }
    entries.extend(current);
    entries.retain(|e| !e.header.is_empty() || !e.bullets.is_empty());
    entries
}

fn to_experience(raw: RawEntry) -> ExperienceItem {
    let mut header = raw.header.into_iter();
    let mut bullets = raw.bullets.into_iter();
    let first = header
        .next()
        .or_else(|| bullets.next())
        .unwrap_or_default();

    let (title, mut company) = match split_pair(&first) {
        Some((title, company)) => (title, Some(company)),
        None => (first, None),
    };

    let mut highlights = Vec::new();
    for line in header {
        if company.is_none() {
            company = Some(line);
        } else {
            highlights.push(line);
        }
    }
    highlights.extend(bullets);

    let (start_date, end_date) = match raw.dates {
        Some(range) => (Some(range.start), Some(range.end)),
        None => (None, None),
    };

    ExperienceItem {
        title,
        company,
        start_date,
        end_date,
        highlights,
    }
}

pub fn parse_experience(lines: &[String]) -> Vec<ExperienceItem> {
    group_entries(lines).into_iter().map(to_experience).collect()
}

fn to_education(raw: RawEntry) -> Option<EducationItem> {
    let mut institution: Option<String> = None;
    let mut degree: Option<String> = None;
    let mut details = Vec::new();
    let mut year: Option<String> = None;

    for line in raw.header {
        let line = if raw.dates.is_none() && year.is_none() {
            let (found, rest) = take_single_year(&line);
            year = found;
            rest
        } else {
            line
        };
        if line.is_empty() {
            continue;
        }

        if institution.is_none() && INSTITUTION_RE.is_match(&line) {
            // "BSc Computer Science, University of Cambridge" on one line.
            if degree.is_none() && DEGREE_RE.is_match(&line) {
                if let Some((a, b)) = split_pair(&line) {
                    let (inst, deg) = if INSTITUTION_RE.is_match(&b) { (b, a) } else { (a, b) };
                    institution = Some(inst);
                    degree = Some(deg);
                    continue;
                }
            }
            institution = Some(line);
        } else if degree.is_none() && DEGREE_RE.is_match(&line) {
            degree = Some(line);
        } else {
            details.push(line);
        }
    }
    details.extend(raw.bullets);

    let institution = match institution {
        Some(i) => i,
        None if !details.is_empty() => details.remove(0),
        None => degree.clone()?,
    };

    let (start_date, end_date) = match raw.dates {
        Some(range) => (Some(range.start), Some(range.end)),
        None => (None, year),
    };

    Some(EducationItem {
        institution,
        degree,
        start_date,
        end_date,
        details,
    })
}

pub fn parse_education(lines: &[String]) -> Vec<EducationItem> {
    group_entries(lines)
        .into_iter()
        .filter_map(to_education)
        .collect()
}

/// Flattens skill lists, dropping `Category:` labels and case-insensitive duplicates.
/// Case-folded form used to decide whether two skills are the same.
pub fn skill_key(skill: &str) -> String {
    skill.to_lowercase()
}

pub fn parse_skills(lines: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut skills = Vec::new();

    for line in lines {
        let line = strip_bullet(line).unwrap_or_else(|| line.trim());
        let line = match line.split_once(':') {
            Some((label, rest)) if label.split_whitespace().count() <= MAX_HEADING_WORDS => rest,
            _ => line,
        };
        for item in line.split([',', ';', '|', '•', '·']) {
            let item = item.trim().trim_end_matches('.').trim();
            if item.is_empty() || item.len() > MAX_SKILL_LEN {
                continue;
            }
            if seen.insert(skill_key(item)) {
                skills.push(item.to_string());
            }
        }
    }
    skills
}

pub fn parse_summary(lines: &[String]) -> Option<String> {
    let text = lines
        .iter()
        .map(|l| strip_bullet(l).unwrap_or_else(|| l.trim()))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn test_heading_kind_variants() {
        assert_eq!(heading_kind("EXPERIENCE"), Some(SectionKind::Experience));
        assert_eq!(heading_kind("Work Experience:"), Some(SectionKind::Experience));
        assert_eq!(heading_kind("Skills & Tools"), Some(SectionKind::Skills));
        assert_eq!(heading_kind("  Education  "), Some(SectionKind::Education));
        assert_eq!(heading_kind("Experience with large distributed systems"), None);
        assert_eq!(heading_kind(""), None);
    }

    #[test]
    fn test_split_sections_keeps_preamble() {
        let (preamble, sections) =
            split_sections("Ada Lovelace\nada@example.com\nSkills\nRust, Go\nEducation\nOxford");
        assert_eq!(preamble, vec!["Ada Lovelace", "ada@example.com"]);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].kind, SectionKind::Skills);
        assert_eq!(sections[1].lines, vec!["Oxford"]);
    }

    #[test]
    fn test_find_date_range_variants() {
        let (range, rest) = find_date_range("Senior Engineer, Acme  Jan 2020 - Present").unwrap();
        assert_eq!(range.start, "Jan 2020");
        assert_eq!(range.end, "Present");
        assert_eq!(rest, "Senior Engineer, Acme");

        let (range, _) = find_date_range("03/2017 – 12/2019").unwrap();
        assert_eq!(range.start, "03/2017");
        assert_eq!(range.end, "12/2019");

        let (range, rest) = find_date_range("(2015 to 2018) Analyst").unwrap();
        assert_eq!(range.start, "2015");
        assert_eq!(rest, "Analyst");

        assert!(find_date_range("Managed a team of 12").is_none());
    }

    #[test]
    fn test_strip_bullet() {
        assert_eq!(strip_bullet("• Shipped v2"), Some("Shipped v2"));
        assert_eq!(strip_bullet("  - Led migration"), Some("Led migration"));
        assert_eq!(strip_bullet("-"), None);
        assert_eq!(strip_bullet("Plain line"), None);
    }

    #[test]
    fn test_parse_experience_entries() {
        let section = lines(
            "Senior Engineer at Acme Corp   Jan 2020 - Present\n\
             • Led the billing rewrite\n\
             • Cut p99 latency by 40%\n\
             \n\
             Software Engineer\n\
             Globex\n\
             2016 - 2019\n\
             - Built the ingestion pipeline",
        );
        let items = parse_experience(&section);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Senior Engineer");
        assert_eq!(items[0].company.as_deref(), Some("Acme Corp"));
        assert_eq!(items[0].start_date.as_deref(), Some("Jan 2020"));
        assert_eq!(items[0].end_date.as_deref(), Some("Present"));
        assert_eq!(items[0].highlights.len(), 2);

        assert_eq!(items[1].title, "Software Engineer");
        assert_eq!(items[1].company.as_deref(), Some("Globex"));
        assert_eq!(items[1].end_date.as_deref(), Some("2019"));
        assert_eq!(items[1].highlights, vec!["Built the ingestion pipeline"]);
    }

    #[test]
    fn test_back_to_back_entries_split_on_second_date_range() {
        let section = lines(
            "Engineer, Initech 2019 - 2021\n\
             Intern, Initrode 2018 - 2019",
        );
        let items = parse_experience(&section);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].company.as_deref(), Some("Initrode"));
    }

    #[test]
    fn test_parse_education_combined_line() {
        let section = lines("BSc Computer Science, University of Cambridge, 2014\nFirst class honours");
        let items = parse_education(&section);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].degree.as_deref(), Some("BSc Computer Science"));
        assert!(items[0].institution.starts_with("University of Cambridge"));
        assert_eq!(items[0].end_date.as_deref(), Some("2014"));
        assert_eq!(items[0].details, vec!["First class honours"]);
    }

    #[test]
    fn test_parse_education_separate_lines() {
        let section = lines("Imperial College London\nMaster of Science in Computing\n2012 - 2013");
        let items = parse_education(&section);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].institution, "Imperial College London");
        assert_eq!(
            items[0].degree.as_deref(),
            Some("Master of Science in Computing")
        );
        assert_eq!(items[0].start_date.as_deref(), Some("2012"));
    }

    #[test]
    fn test_parse_skills_dedups_and_drops_labels() {
        let section = lines(
            "Languages: Rust, Go, TypeScript\n\
             • Tools: Docker; Kubernetes | rust\n\
             PostgreSQL.",
        );
        assert_eq!(
            parse_skills(&section),
            vec!["Rust", "Go", "TypeScript", "Docker", "Kubernetes", "PostgreSQL"]
        );
    }

    #[test]
    fn test_parse_summary_joins_lines() {
        let section = lines("Engineer with ten years\nof backend experience.\n");
        assert_eq!(
            parse_summary(&section).as_deref(),
            Some("Engineer with ten years of backend experience.")
        );
        assert_eq!(parse_summary(&lines("\n\n")), None);
    }
}
