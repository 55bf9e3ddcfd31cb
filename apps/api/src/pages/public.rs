use std::fmt::Write;

use axum::{
    extract::{Path, Query},
    response::Html,
};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::pages::html::{escape, page};
use crate::search::{filter_entries, group_by_section, SearchQuery, INDEX};
use crate::templates::catalog::catalog;
use crate::templates::Theme;
use crate::websites::render::{render_site, sample_site};

/// GET /
pub async fn home_page(user: Option<AuthUser>) -> Html<String> {
    let cta = match &user {
        Some(_) => r#"<a href="/upload">Upload a CV</a> or open your <a href="/dashboard">dashboard</a>."#,
        None => r#"<a href="/register">Create an account</a> or <a href="/login">sign in</a> to get started."#,
    };
    let body = format!(
        "<h1>Turn your CV into a personal website</h1>\
         <p>Upload a PDF or Word CV, pick a theme and publish a site in minutes.</p>\
         <p>{cta}</p><p>Browse the <a href=\"/examples\">theme examples</a>.</p>"
    );
    page("Home", user.as_ref(), &body)
}

pub fn examples_body() -> String {
    let mut html = String::from("<h1>Themes</h1><ul>");
    for info in catalog() {
        let _ = write!(
            html,
            r#"<li><a href="/examples/{slug}"><strong>{name}</strong></a> · {description}</li>"#,
            slug = info.id.slug(),
            name = escape(info.name),
            description = escape(info.description),
        );
    }
    html.push_str("</ul>");
    html
}

/// GET /examples
pub async fn examples_page(user: Option<AuthUser>) -> Html<String> {
    page("Examples", user.as_ref(), &examples_body())
}

/// GET /examples/:theme
pub async fn example_preview(Path(theme): Path<String>) -> Result<Html<String>, AppError> {
    let theme: Theme = theme.parse().map_err(AppError::NotFound)?;
    Ok(Html(render_site(
        &format!("{} example", theme.name()),
        &sample_site(theme),
    )))
}

pub fn sections_body(query: &str) -> String {
    let results = filter_entries(INDEX, query);
    let mut html = format!(
        r#"<h1>Help</h1><form method="get" action="/sections"><input type="search" name="q" value="{}" placeholder="Search help"> <button type="submit">Search</button></form>"#,
        escape(query)
    );
    if results.is_empty() {
        html.push_str("<p>No matching topics.</p>");
        return html;
    }
    for (section, entries) in group_by_section(&results) {
        let _ = write!(html, "<h2>{}</h2><ul>", escape(section));
        for e in entries {
            let _ = write!(
                html,
                r#"<li><a href="{}">{}</a> · {}</li>"#,
                escape(e.href),
                escape(e.title),
                escape(e.content)
            );
        }
        html.push_str("</ul>");
    }
    html
}

/// GET /sections?q=
pub async fn sections_page(
    user: Option<AuthUser>,
    Query(params): Query<SearchQuery>,
) -> Html<String> {
    page("Help", user.as_ref(), &sections_body(&params.q))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_lists_every_theme() {
        let body = examples_body();
        for theme in Theme::ALL {
            assert!(body.contains(&format!("/examples/{}", theme.slug())));
        }
    }

    #[tokio::test]
    async fn test_example_preview_renders_known_theme() {
        let Html(html) = example_preview(Path("neomorph".to_string())).await.unwrap();
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("theme-neomorph"));
    }

    #[tokio::test]
    async fn test_example_preview_unknown_theme_is_not_found() {
        let err = example_preview(Path("brutalist".to_string())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_sections_groups_filtered_results() {
        let body = sections_body("publish");
        assert!(body.contains("<h2>Publishing</h2>"));
        assert!(!body.contains("<h2>Account</h2>"));
    }

    #[test]
    fn test_sections_escapes_query_and_reports_no_match() {
        let body = sections_body("<zzz>");
        assert!(body.contains(r#"value="&lt;zzz&gt;""#));
        assert!(body.contains("No matching topics."));
    }
}
