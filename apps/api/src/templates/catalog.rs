//! Built-in site themes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Glass,
    Neomorph,
    #[default]
    Minimal,
    Classic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeInfo {
    pub id: Theme,
    pub name: &'static str,
    pub description: &'static str,
    pub palette: Palette,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Glass, Theme::Neomorph, Theme::Minimal, Theme::Classic];

    pub fn slug(self) -> &'static str {
        match self {
            Theme::Glass => "glass",
            Theme::Neomorph => "neomorph",
            Theme::Minimal => "minimal",
            Theme::Classic => "classic",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Glass => "Glassmorphism",
            Theme::Neomorph => "Neumorphism",
            Theme::Minimal => "Minimal",
            Theme::Classic => "Classic",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Theme::Glass => "Frosted translucent cards over a vivid gradient backdrop.",
            Theme::Neomorph => "Soft extruded surfaces with paired light and dark shadows.",
            Theme::Minimal => "Plain typography, generous whitespace, a single accent colour.",
            Theme::Classic => "Serif headings and ruled sections in the style of a printed CV.",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Glass => Palette {
                background: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
                surface: "rgba(255, 255, 255, 0.18)",
                text: "#ffffff",
                muted: "rgba(255, 255, 255, 0.75)",
                accent: "#ffd166",
                border: "rgba(255, 255, 255, 0.35)",
            },
            Theme::Neomorph => Palette {
                background: "#e0e5ec",
                surface: "#e0e5ec",
                text: "#31344b",
                muted: "#6b6f85",
                accent: "#4d7cfe",
                border: "transparent",
            },
            Theme::Minimal => Palette {
                background: "#ffffff",
                surface: "#ffffff",
                text: "#111827",
                muted: "#6b7280",
                accent: "#2563eb",
                border: "#e5e7eb",
            },
            Theme::Classic => Palette {
                background: "#fdfbf7",
                surface: "#fdfbf7",
                text: "#2b2b2b",
                muted: "#5c5c5c",
                accent: "#8b1e3f",
                border: "#2b2b2b",
            },
        }
    }

    /// Rules layered on top of the shared site stylesheet.
    pub fn extra_css(self) -> &'static str {
        match self {
            Theme::Glass => {
                ".card{backdrop-filter:blur(12px);-webkit-backdrop-filter:blur(12px);\
                 border-radius:16px;box-shadow:0 8px 32px rgba(31,38,135,.25)}"
            }
            Theme::Neomorph => {
                ".card{border-radius:20px;box-shadow:9px 9px 16px #a3b1c6,-9px -9px 16px #ffffff}"
            }
            Theme::Minimal => ".card{border-width:0 0 1px 0;border-radius:0}",
            Theme::Classic => {
                "body{font-family:Georgia,'Times New Roman',serif}\
                 h2{text-transform:uppercase;letter-spacing:.08em;border-bottom:2px solid var(--border)}\
                 .card{border:none}"
            }
        }
    }

    pub fn info(self) -> ThemeInfo {
        ThemeInfo {
            id: self,
            name: self.name(),
            description: self.description(),
            palette: self.palette(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| t.slug() == wanted)
            .ok_or_else(|| format!("Unknown theme '{}'", s.trim()))
    }
}

pub fn catalog() -> Vec<ThemeInfo> {
    Theme::ALL.into_iter().map(Theme::info).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_every_theme_once() {
        let ids: Vec<&str> = catalog().iter().map(|t| t.id.slug()).collect();
        assert_eq!(ids, vec!["glass", "neomorph", "minimal", "classic"]);
    }

    #[test]
    fn test_theme_from_str_is_case_insensitive() {
        assert_eq!("Glass".parse::<Theme>(), Ok(Theme::Glass));
        assert_eq!(" classic ".parse::<Theme>(), Ok(Theme::Classic));
        assert!("brutalist".parse::<Theme>().is_err());
    }

    #[test]
    fn test_theme_serde_uses_slug() {
        assert_eq!(serde_json::to_string(&Theme::Neomorph).unwrap(), "\"neomorph\"");
        let theme: Theme = serde_json::from_str("\"minimal\"").unwrap();
        assert_eq!(theme, Theme::Minimal);
        assert_eq!(Theme::default(), Theme::Minimal);
    }

    #[test]
    fn test_catalog_serializes_palette() {
        let json = serde_json::to_value(Theme::Classic.info()).unwrap();
        assert_eq!(json["id"], "classic");
        assert_eq!(json["palette"]["accent"], "#8b1e3f");
    }
}
