//! CV parsing: document → text → [`ParsedResume`].

pub mod extract;
pub mod fields;
pub mod handlers;
pub mod sections;

use crate::models::resume::ParsedResume;
use extract::ExtractError;
use sections::SectionKind;

/// Extracts text from an uploaded document and parses it.
pub async fn parse_document(
    file_name: &str,
    content_type: Option<&str>,
    data: bytes::Bytes,
) -> Result<ParsedResume, ExtractError> {
    let text = extract::extract_text(file_name, content_type, data).await?;
    Ok(parse_text(&text))
}

pub fn parse_text(text: &str) -> ParsedResume {
    let mut resume = ParsedResume {
        personal_info: fields::extract_personal_info(text),
        ..Default::default()
    };

    let (_preamble, found) = sections::split_sections(text);
    for section in &found {
        match section.kind {
            SectionKind::Summary => {
                if resume.personal_info.summary.is_none() {
                    resume.personal_info.summary = sections::parse_summary(&section.lines);
                }
            }
            SectionKind::Experience => resume
                .experience
                .extend(sections::parse_experience(&section.lines)),
            SectionKind::Projects => resume
                .projects
                .extend(sections::parse_experience(&section.lines)),
            SectionKind::Education => resume
                .education
                .extend(sections::parse_education(&section.lines)),
            SectionKind::Skills => {
                for skill in sections::parse_skills(&section.lines) {
                    let key = sections::skill_key(&skill);
                    if !resume.skills.iter().any(|s| sections::skill_key(s) == key) {
                        resume.skills.push(skill);
                    }
                }
            }
            SectionKind::Other => {}
        }
    }

    if found.is_empty() {
        resume
            .warnings
            .push("No section headings were recognised".to_string());
    }
    if resume.personal_info.name.is_none() {
        resume
            .warnings
            .push("Could not determine the candidate's name".to_string());
    }
    if resume.experience.is_empty() {
        resume.warnings.push("No work experience found".to_string());
    }
    if resume.education.is_empty() {
        resume.warnings.push("No education found".to_string());
    }

    resume.confidence = score_confidence(&resume);
    resume
}

/// Weighted presence score over the fields a generated site relies on.
pub fn score_confidence(resume: &ParsedResume) -> f64 {
    let info = &resume.personal_info;
    let mut score: f64 = 0.0;

    if info.name.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        score += 0.15;
    }
    if info.email.is_some() {
        score += 0.25;
    }
    if info.phone.is_some() {
        score += 0.1;
    }
    if !resume.experience.is_empty() {
        score += 0.25;
    }
    if !resume.education.is_empty() {
        score += 0.15;
    }
    if !resume.skills.is_empty() {
        score += 0.1;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CV: &str = "\
Grace Hopper
grace@navy.example | +1 (201) 555-0123 | github.com/ghopper

Summary
Computer scientist and naval officer who likes compilers.

Experience
Senior Programmer at Eckert-Mauchly   1949 - 1959
• Built the A-0 compiler
• Led the FLOW-MATIC team

Education
PhD Mathematics, Yale University, 1934

Skills
COBOL, FLOW-MATIC, Compilers

Projects
UNIVAC I 1951 - 1952
- Wrote early subroutine libraries
";

    #[test]
    fn test_parse_text_full_sample() {
        let resume = parse_text(SAMPLE_CV);
        let info = &resume.personal_info;
        assert_eq!(info.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(info.email.as_deref(), Some("grace@navy.example"));
        assert_eq!(info.phone.as_deref(), Some("+12015550123"));
        assert_eq!(info.github.as_deref(), Some("https://github.com/ghopper"));
        assert_eq!(
            info.summary.as_deref(),
            Some("Computer scientist and naval officer who likes compilers.")
        );

        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].title, "Senior Programmer");
        assert_eq!(resume.experience[0].highlights.len(), 2);

        assert_eq!(resume.education.len(), 1);
        assert_eq!(resume.education[0].institution, "Yale University");
        assert_eq!(resume.education[0].degree.as_deref(), Some("PhD Mathematics"));

        assert_eq!(resume.skills, vec!["COBOL", "FLOW-MATIC", "Compilers"]);
        assert_eq!(resume.projects.len(), 1);
        assert!(resume.warnings.is_empty());
        assert!((resume.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_skills_from_two_sections_dedupe_beyond_ascii() {
        let text = "Ada Lovelace\n\nSkills\nÉCRITURE, Rust\n\nTechnical Skills\nécriture, rust, Go";
        let resume = parse_text(text);
        assert_eq!(resume.skills, vec!["ÉCRITURE", "Rust", "Go"]);
    }

    #[test]
    fn test_unstructured_text_produces_warnings() {
        let resume = parse_text("just some notes without any structure");
        assert!(resume.experience.is_empty());
        assert!(resume
            .warnings
            .iter()
            .any(|w| w.contains("No section headings")));
        assert!(resume.confidence < 0.01);
    }

    #[tokio::test]
    async fn test_parse_document_plain_text() {
        let resume = parse_document("cv.txt", Some("text/plain"), bytes::Bytes::from(SAMPLE_CV))
            .await
            .unwrap();
        assert_eq!(resume.personal_info.name.as_deref(), Some("Grace Hopper"));
    }
}
