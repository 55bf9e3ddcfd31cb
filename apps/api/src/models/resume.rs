use serde::{Deserialize, Serialize};

/// Contact details and headline pulled from the top of a CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub title: String,
    pub company: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub institution: String,
    pub degree: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

/// Structured view of an uploaded CV. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub projects: Vec<ExperienceItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// 0.0 – 1.0
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ParsedResume {
    /// Name if found, otherwise the first job title, otherwise a generic label.
    pub fn display_name(&self) -> &str {
        self.personal_info
            .name
            .as_deref()
            .or_else(|| self.experience.first().map(|e| e.title.as_str()))
            .unwrap_or("My CV")
    }
}
