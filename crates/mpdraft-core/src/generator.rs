//! Templated article text.
//!
//! Everything here is a pure function of the [`ArticleRequest`]: identical
//! input produces byte-identical markdown.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{self, TOC_MARKER};

pub const MIN_PARAGRAPHS: usize = 2;
pub const MAX_PARAGRAPHS: usize = 12;
pub const DEFAULT_PARAGRAPHS: usize = 4;

const SUMMARY_PLACEHOLDER: &str = "This is an automatically generated article summary.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("article title must not be empty")]
    EmptyTitle,
}

/// Writing style, which selects the guidance line and any extra per-section sentences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArticleStyle {
    #[default]
    Generic,
    PopularScience,
    IndustryAnalysis,
    EventPromotion,
}

impl ArticleStyle {
    pub const ALL: [ArticleStyle; 4] = [
        ArticleStyle::Generic,
        ArticleStyle::PopularScience,
        ArticleStyle::IndustryAnalysis,
        ArticleStyle::EventPromotion,
    ];

    /// Form/CLI value.
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStyle::Generic => "generic",
            ArticleStyle::PopularScience => "popular-science",
            ArticleStyle::IndustryAnalysis => "industry-analysis",
            ArticleStyle::EventPromotion => "event-promotion",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArticleStyle::Generic => "Generic",
            ArticleStyle::PopularScience => "Popular science",
            ArticleStyle::IndustryAnalysis => "Industry analysis",
            ArticleStyle::EventPromotion => "Event promotion",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            ArticleStyle::Generic => "Explain the topic in a clear, friendly voice.",
            ArticleStyle::PopularScience => {
                "Write for non-specialists and explain concepts with everyday analogies."
            }
            ArticleStyle::IndustryAnalysis => {
                "Combine current conditions, trends and data; emphasise insight and strategy."
            }
            ArticleStyle::EventPromotion => {
                "Highlight the appeal and value of the event and drive readers to sign up."
            }
        }
    }

    fn extra_section_lines(self) -> &'static [&'static str] {
        match self {
            ArticleStyle::IndustryAnalysis => {
                &["Data and cases: cite industry data or a representative case to support the point."]
            }
            ArticleStyle::EventPromotion => {
                &["Highlights and sign-up: stress what makes the event special and how to register or ask questions."]
            }
            ArticleStyle::Generic | ArticleStyle::PopularScience => &[],
        }
    }

    /// Lenient parse used for form input: unknown values fall back to [`ArticleStyle::Generic`].
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for ArticleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        ArticleStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| format!("unknown article style '{}'", value.trim()))
    }
}

/// Inputs to the generator, shared by preview and publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleRequest {
    pub title: String,
    pub keywords: String,
    pub summary: String,
    pub style: ArticleStyle,
    /// Raw requested section count; clamped with [`clamp_paragraphs`].
    pub paragraphs: Option<i64>,
    pub toc: bool,
}

impl ArticleRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn style(mut self, style: ArticleStyle) -> Self {
        self.style = style;
        self
    }

    pub fn paragraphs(mut self, paragraphs: i64) -> Self {
        self.paragraphs = Some(paragraphs);
        self
    }

    pub fn toc(mut self, toc: bool) -> Self {
        self.toc = toc;
        self
    }

    pub fn section_count(&self) -> usize {
        clamp_paragraphs(self.paragraphs)
    }

    /// Trimmed, non-empty keywords in input order.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Missing or zero means the default; anything else is clamped into `[2, 12]`.
pub fn clamp_paragraphs(requested: Option<i64>) -> usize {
    match requested {
        None | Some(0) => DEFAULT_PARAGRAPHS,
        Some(n) => n.clamp(MIN_PARAGRAPHS as i64, MAX_PARAGRAPHS as i64) as usize,
    }
}

pub fn generate_markdown(request: &ArticleRequest) -> Result<String, ContentError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ContentError::EmptyTitle);
    }

    let mut sections: Vec<String> = Vec::new();
    if request.toc {
        sections.push(TOC_MARKER.to_string());
    }
    sections.push(format!("# {title}"));

    let summary = request.summary.trim();
    sections.push(if summary.is_empty() {
        SUMMARY_PLACEHOLDER.to_string()
    } else {
        summary.to_string()
    });

    sections.push("## Key Points".to_string());
    let keywords = request.keyword_list();
    if !keywords.is_empty() {
        sections.push(
            keywords
                .iter()
                .map(|k| format!("- {k}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    let style = request.style;
    sections.push("\n## Body".to_string());
    sections.push(format!("Style: {} ({})", style.label(), style.hint()));

    for i in 1..=request.section_count() {
        sections.push(format!("### Section {i}"));
        sections.push(
            "Background and problem: describe what this section focuses on and the pain points readers care about."
                .to_string(),
        );
        sections.push(
            "Method and advice: offer two or three actionable suggestions, with examples where possible."
                .to_string(),
        );
        sections.extend(style.extra_section_lines().iter().map(|s| s.to_string()));
    }

    sections.push("\n## Conclusion".to_string());
    sections.push("Summarise the key points and suggest the next steps to take.".to_string());

    Ok(sections.join("\n\n"))
}

/// Markdown source alongside its HTML rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArticle {
    pub markdown: String,
    pub html: String,
}

pub fn render_article(request: &ArticleRequest) -> Result<RenderedArticle, ContentError> {
    let markdown = generate_markdown(request)?;
    let html = render::markdown_to_html(&markdown);
    Ok(RenderedArticle { markdown, html })
}
