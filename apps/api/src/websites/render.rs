//! Static HTML rendering of a website from its parsed CV and theme.

use std::fmt::Write;

use crate::models::resume::{EducationItem, ExperienceItem, ParsedResume, PersonalInfo};
use crate::models::website::SiteContent;
use crate::pages::html::escape;
use crate::templates::Theme;

const BASE_CSS: &str = "*{box-sizing:border-box}\
body{margin:0;font-family:system-ui,-apple-system,'Segoe UI',sans-serif;line-height:1.6;\
background:var(--bg);color:var(--text);min-height:100vh}\
main{max-width:860px;margin:0 auto;padding:48px 20px}\
header{text-align:center;margin-bottom:32px}\
h1{margin:0;font-size:2.4rem}\
.headline{color:var(--muted);margin:4px 0 12px}\
.contact{list-style:none;padding:0;display:flex;flex-wrap:wrap;gap:12px;justify-content:center}\
a{color:var(--accent)}\
.card{background:var(--surface);border:1px solid var(--border);padding:20px 24px;margin-bottom:20px;border-radius:8px}\
.entry{margin-bottom:16px}\
.entry h3{margin:0}\
.meta{color:var(--muted);font-size:.9rem}\
.skills{list-style:none;padding:0;display:flex;flex-wrap:wrap;gap:8px}\
.skills li{border:1px solid var(--accent);border-radius:999px;padding:2px 12px}\
footer{text-align:center;color:var(--muted);font-size:.8rem;margin-top:40px}";

fn theme_css(theme: Theme) -> String {
    let p = theme.palette();
    format!(
        ":root{{--bg:{};--surface:{};--text:{};--muted:{};--accent:{};--border:{}}}{}{}",
        p.background,
        p.surface,
        p.text,
        p.muted,
        p.accent,
        p.border,
        BASE_CSS,
        theme.extra_css()
    )
}

/// Only http(s) and mailto links become anchors; anything else is shown as text.
fn safe_href(url: &str) -> Option<String> {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
    {
        Some(escape(url.trim()))
    } else {
        None
    }
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{s} – {e}")),
        (Some(s), None) => Some(format!("{s} – Present")),
        (None, Some(e)) => Some(e.to_string()),
        (None, None) => None,
    }
}

fn render_contact(info: &PersonalInfo) -> String {
    let mut items = Vec::new();
    if let Some(email) = &info.email {
        let href = safe_href(&format!("mailto:{email}")).unwrap_or_default();
        items.push(format!(r#"<li><a href="{href}">{}</a></li>"#, escape(email)));
    }
    if let Some(phone) = &info.phone {
        items.push(format!("<li>{}</li>", escape(phone)));
    }
    for (label, link) in [
        ("LinkedIn", &info.linkedin),
        ("GitHub", &info.github),
        ("Website", &info.website),
    ] {
        let Some(link) = link else { continue };
        match safe_href(link) {
            Some(href) => items.push(format!(r#"<li><a href="{href}">{label}</a></li>"#)),
            None => items.push(format!("<li>{}</li>", escape(link))),
        }
    }
    if items.is_empty() {
        return String::new();
    }
    format!(r#"<ul class="contact">{}</ul>"#, items.concat())
}

fn render_experience(heading: &str, items: &[ExperienceItem]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut html = format!(r#"<section class="card"><h2>{}</h2>"#, escape(heading));
    for item in items {
        html.push_str(r#"<div class="entry">"#);
        let _ = write!(html, "<h3>{}</h3>", escape(&item.title));
        let meta: Vec<String> = [
            item.company.clone(),
            date_range(item.start_date.as_deref(), item.end_date.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !meta.is_empty() {
            let _ = write!(html, r#"<p class="meta">{}</p>"#, escape(&meta.join(" · ")));
        }
        if !item.highlights.is_empty() {
            html.push_str("<ul>");
            for highlight in &item.highlights {
                let _ = write!(html, "<li>{}</li>", escape(highlight));
            }
            html.push_str("</ul>");
        }
        html.push_str("</div>");
    }
    html.push_str("</section>");
    html
}

fn render_education(items: &[EducationItem]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<section class="card"><h2>Education</h2>"#);
    for item in items {
        html.push_str(r#"<div class="entry">"#);
        let _ = write!(html, "<h3>{}</h3>", escape(&item.institution));
        let meta: Vec<String> = [
            item.degree.clone(),
            date_range(item.start_date.as_deref(), item.end_date.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !meta.is_empty() {
            let _ = write!(html, r#"<p class="meta">{}</p>"#, escape(&meta.join(" · ")));
        }
        for detail in &item.details {
            let _ = write!(html, "<p>{}</p>", escape(detail));
        }
        html.push_str("</div>");
    }
    html.push_str("</section>");
    html
}

fn render_skills(skills: &[String]) -> String {
    if skills.is_empty() {
        return String::new();
    }
    let items: String = skills
        .iter()
        .map(|s| format!("<li>{}</li>", escape(s)))
        .collect();
    format!(r#"<section class="card"><h2>Skills</h2><ul class="skills">{items}</ul></section>"#)
}

/// Renders a complete standalone HTML document for a website.
pub fn render_site(title: &str, content: &SiteContent) -> String {
    let resume = &content.resume;
    let info = &resume.personal_info;
    let name = resume.display_name();
    let headline = resume.experience.first().map(|e| e.title.as_str());
    let summary = content
        .summary
        .as_deref()
        .or(info.summary.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut body = String::new();
    body.push_str("<header>");
    let _ = write!(body, "<h1>{}</h1>", escape(name));
    if let Some(headline) = headline {
        let _ = write!(body, r#"<p class="headline">{}</p>"#, escape(headline));
    }
    body.push_str(&render_contact(info));
    body.push_str("</header>");

    if let Some(summary) = summary {
        let _ = write!(
            body,
            r#"<section class="card"><h2>About</h2><p>{}</p></section>"#,
            escape(summary)
        );
    }
    body.push_str(&render_experience("Experience", &resume.experience));
    body.push_str(&render_experience("Projects", &resume.projects));
    body.push_str(&render_education(&resume.education));
    body.push_str(&render_skills(&resume.skills));

    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><style>{css}</style></head>\
         <body class=\"theme-{theme}\"><main>{body}\
         <footer>Built with cvsite</footer></main></body></html>",
        title = escape(title),
        css = theme_css(content.theme),
        theme = content.theme.slug(),
    )
}

/// Demo CV for the public theme gallery.
pub fn sample_resume() -> ParsedResume {
    ParsedResume {
        personal_info: PersonalInfo {
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            github: Some("https://github.com/ada".into()),
            website: Some("https://ada.example.com".into()),
            summary: Some(
                "Mathematician and writer who published the first algorithm intended \
                 for a computing machine."
                    .into(),
            ),
            ..Default::default()
        },
        experience: vec![ExperienceItem {
            title: "Analyst".into(),
            company: Some("Analytical Engine Project".into()),
            start_date: Some("1842".into()),
            end_date: Some("1843".into()),
            highlights: vec![
                "Translated and annotated Menabrea's memoir on the engine".into(),
                "Described an algorithm computing Bernoulli numbers".into(),
            ],
        }],
        projects: Vec::new(),
        education: vec![EducationItem {
            institution: "Private tutoring".into(),
            degree: Some("Mathematics and logic".into()),
            details: vec!["Studied under Augustus De Morgan".into()],
            ..Default::default()
        }],
        skills: vec!["Mathematics".into(), "Algorithms".into(), "Technical writing".into()],
        confidence: 1.0,
        warnings: Vec::new(),
    }
}

pub fn sample_site(theme: Theme) -> SiteContent {
    SiteContent {
        theme,
        resume: sample_resume(),
        summary: None,
    }
}
