use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use mpdraft_core::{ArticleRequest, ArticleStyle, CoverImage, PublishRequest};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_COVER_NAME: &str = "cover.jpg";

#[derive(Debug, Error)]
pub enum FormError {
    #[error("The title field is required.")]
    MissingTitle,
    #[error("The paragraphs field must be an integer, got '{0}'.")]
    InvalidParagraphs(String),
    #[error("Malformed form upload: {0}")]
    Multipart(#[from] MultipartError),
}

/// HTML checkboxes are absent when unchecked and carry their `value` when checked.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub appsecret: String,
    #[serde(default)]
    pub simulate: Option<String>,
}

impl SettingsForm {
    pub fn simulate(&self) -> bool {
        checkbox(self.simulate.as_deref())
    }
}

/// Article fields as submitted, shared by `/preview` and `/generate-upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub paragraphs: Option<String>,
    #[serde(default)]
    pub toc: Option<String>,
    #[serde(default)]
    pub auto_publish: Option<String>,
}

impl ArticleForm {
    pub fn style(&self) -> ArticleStyle {
        ArticleStyle::parse_lenient(self.style.as_deref().unwrap_or_default())
    }

    pub fn toc(&self) -> bool {
        checkbox(self.toc.as_deref())
    }

    pub fn auto_publish(&self) -> bool {
        checkbox(self.auto_publish.as_deref())
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = value,
            "keywords" => self.keywords = value,
            "summary" => self.summary = value,
            "author" => self.author = value,
            "style" => self.style = Some(value),
            "paragraphs" => self.paragraphs = Some(value),
            "toc" => self.toc = Some(value),
            "auto_publish" => self.auto_publish = Some(value),
            _ => {}
        }
    }

    pub fn to_article(&self) -> Result<ArticleRequest, FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingTitle);
        }
        let paragraphs = match self.paragraphs.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| FormError::InvalidParagraphs(raw.to_string()))?,
            ),
        };
        Ok(ArticleRequest {
            title: self.title.clone(),
            keywords: self.keywords.clone(),
            summary: self.summary.clone(),
            style: self.style(),
            paragraphs,
            toc: self.toc(),
        })
    }
}

/// Reads the generate-and-upload form. An empty file part counts as no cover.
pub async fn read_publish_form(
    mut multipart: Multipart,
) -> Result<(ArticleForm, PublishRequest), FormError> {
    let mut form = ArticleForm::default();
    let mut cover = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "cover_image" {
            let filename = field
                .file_name()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(DEFAULT_COVER_NAME)
                .to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                cover = Some(CoverImage {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }
        let value = field.text().await?;
        form.set(&name, value);
    }

    let request = PublishRequest {
        article: form.to_article()?,
        author: form.author.clone(),
        auto_publish: form.auto_publish(),
        cover,
    };
    Ok((form, request))
}
