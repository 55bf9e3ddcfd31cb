// Prompt builders for the AI endpoints. Instruction-tuned models on the
// hosted API take a single `[INST] ... [/INST]` prompt, no system role.

use crate::models::resume::ParsedResume;

/// Fragment that asks for a bare JSON object.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single valid JSON object only. \
    Do NOT use markdown code fences. \
    Do NOT include explanations before or after the JSON.";

const MAX_SUMMARY_HIGHLIGHTS: usize = 3;
const MAX_SUMMARY_SKILLS: usize = 15;

fn instruct(body: &str) -> String {
    format!("<s>[INST] {} [/INST]", body.trim())
}

pub fn interview_feedback_prompt(question: &str, answer: &str, role: Option<&str>) -> String {
    let role_line = match role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => format!("The candidate is interviewing for the role: {role}.\n"),
        None => String::new(),
    };

    instruct(&format!(
        "You are an experienced interviewer reviewing a candidate's answer.\n\
         {role_line}\
         Question: {question}\n\
         Answer: {answer}\n\n\
         Evaluate the answer. Return JSON with exactly these keys:\n\
         \"score\": integer from 1 to 10,\n\
         \"strengths\": array of short strings,\n\
         \"improvements\": array of short strings,\n\
         \"summary\": one or two sentences of overall feedback.\n\
         {JSON_ONLY_INSTRUCTION}",
        question = question.trim(),
        answer = answer.trim(),
    ))
}

/// Condenses the parsed CV into a compact fact sheet for the summary prompt.
pub fn resume_digest(resume: &ParsedResume) -> String {
    let mut lines = Vec::new();
    let info = &resume.personal_info;

    if let Some(name) = &info.name {
        lines.push(format!("Name: {name}"));
    }
    if let Some(summary) = &info.summary {
        lines.push(format!("Existing summary: {summary}"));
    }
    for item in &resume.experience {
        let mut line = format!("Experience: {}", item.title);
        if let Some(company) = &item.company {
            line.push_str(&format!(" at {company}"));
        }
        if let Some(start) = &item.start_date {
            let end = item.end_date.as_deref().unwrap_or("Present");
            line.push_str(&format!(" ({start} - {end})"));
        }
        lines.push(line);
        for highlight in item.highlights.iter().take(MAX_SUMMARY_HIGHLIGHTS) {
            lines.push(format!("  - {highlight}"));
        }
    }
    for item in &resume.education {
        match &item.degree {
            Some(degree) => lines.push(format!("Education: {degree}, {}", item.institution)),
            None => lines.push(format!("Education: {}", item.institution)),
        }
    }
    if !resume.skills.is_empty() {
        let skills: Vec<&str> = resume
            .skills
            .iter()
            .take(MAX_SUMMARY_SKILLS)
            .map(String::as_str)
            .collect();
        lines.push(format!("Skills: {}", skills.join(", ")));
    }
    lines.join("\n")
}

pub fn site_summary_prompt(resume: &ParsedResume) -> String {
    instruct(&format!(
        "Write a professional summary for the home page of a personal website, \
         based only on the CV facts below. Use the third person, two to four \
         sentences, at most 600 characters. Do not invent employers, titles or \
         skills. Return only the summary text.\n\n{}",
        resume_digest(resume)
    ))
}
