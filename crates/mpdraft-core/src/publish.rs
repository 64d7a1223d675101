//! Generate → token → cover upload → draft → optional publish.
//!
//! Every step runs once; the first failure ends the request. The one exception
//! is the final publish submission: its failure leaves the draft in place and
//! is reported as a partial success.

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::FileConfig;
use crate::generator::{ArticleRequest, ContentError, RenderedArticle, render_article};
use crate::wechat::{ApiError, CoverImage, DraftArticle, PlatformApi, PublishReceipt};

const SIMULATED_ID_MODULUS: u64 = 100_000;

/// Everything a single generate-and-upload submission carries.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub article: ArticleRequest,
    pub author: String,
    pub auto_publish: bool,
    pub cover: Option<CoverImage>,
}

/// Terminal failures. Each maps to its own user-facing message.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Cannot generate the article: {0}")]
    Content(#[from] ContentError),
    #[error(
        "Configure and save the WeChat AppID and AppSecret at the top of the page, or switch on simulate mode."
    )]
    MissingCredentials,
    #[error("Failed to obtain access_token: {0}")]
    Token(#[source] ApiError),
    #[error("Please upload a cover image (JPG/PNG).")]
    MissingCover,
    #[error("Failed to upload the cover image: {0}")]
    Upload(#[source] ApiError),
    #[error("Failed to create the draft: {0}")]
    Draft(#[source] ApiError),
}

#[derive(Debug)]
pub enum PublishStatus {
    NotRequested,
    Submitted(PublishReceipt),
    /// Draft exists but the publish submission was rejected.
    Failed(ApiError),
}

#[derive(Debug)]
pub struct PublishOutcome {
    pub media_id: String,
    pub thumb_media_id: String,
    pub simulated: bool,
    pub publish: PublishStatus,
    pub article: RenderedArticle,
}

impl PublishOutcome {
    pub fn receipt(&self) -> Option<&PublishReceipt> {
        match &self.publish {
            PublishStatus::Submitted(receipt) => Some(receipt),
            _ => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.publish, PublishStatus::Failed(_))
    }

    pub fn message(&self) -> String {
        let prefix = if self.simulated { "[Simulated] " } else { "" };
        match &self.publish {
            PublishStatus::NotRequested => format!("{prefix}Draft created"),
            PublishStatus::Submitted(_) => {
                format!("{prefix}Draft created and submitted for publication")
            }
            PublishStatus::Failed(err) => format!(
                "{prefix}Draft created (media_id={}), but automatic publishing failed: {err}",
                self.media_id
            ),
        }
    }
}

/// Stable placeholder id: `{prefix}_{n}` with `n` taken from the SHA-256 of `seed`.
pub fn simulated_id(prefix: &str, seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    format!(
        "{prefix}_{}",
        u64::from_be_bytes(head) % SIMULATED_ID_MODULUS
    )
}

/// Runs the pipeline against `api` using `config` as loaded for this request.
pub async fn publish<A>(
    api: &A,
    config: &FileConfig,
    request: PublishRequest,
) -> Result<PublishOutcome, PublishError>
where
    A: PlatformApi + Sync,
{
    let article = render_article(&request.article)?;
    let title = request.article.title.trim().to_string();
    let author = request.author.trim().to_string();

    if config.simulate {
        let thumb_media_id = simulated_id("SIM_THUMB", &title);
        let media_id = simulated_id("SIM_MEDIA", &format!("{title}{author}"));
        let publish = if request.auto_publish {
            PublishStatus::Submitted(PublishReceipt {
                errcode: 0,
                errmsg: "ok".to_string(),
                publish_id: Some(simulated_id("SIM_PUB", &media_id)),
                msg_data_id: None,
            })
        } else {
            PublishStatus::NotRequested
        };
        info!(%media_id, auto_publish = request.auto_publish, "Simulated draft created");
        return Ok(PublishOutcome {
            media_id,
            thumb_media_id,
            simulated: true,
            publish,
            article,
        });
    }

    if !config.has_credentials() {
        warn!("Live publish attempted without credentials");
        return Err(PublishError::MissingCredentials);
    }

    let token = api
        .access_token(&config.appid, &config.appsecret)
        .await
        .map_err(PublishError::Token)?;
    info!("Access token obtained");

    let Some(cover) = request.cover.as_ref() else {
        return Err(PublishError::MissingCover);
    };

    let thumb_media_id = api
        .upload_image(&token, cover)
        .await
        .map_err(PublishError::Upload)?;
    info!(%thumb_media_id, bytes = cover.bytes.len(), "Cover image uploaded");

    let summary = request.article.summary.trim();
    let draft = DraftArticle {
        title: title.clone(),
        author,
        digest: if summary.is_empty() {
            title
        } else {
            summary.to_string()
        },
        content: article.html.clone(),
        thumb_media_id: thumb_media_id.clone(),
        need_open_comment: 0,
        only_fans_can_comment: 0,
    };
    let media_id = api
        .add_draft(&token, &draft)
        .await
        .map_err(PublishError::Draft)?;
    info!(%media_id, "Draft created");

    let publish = if request.auto_publish {
        match api.submit_publish(&token, &media_id).await {
            Ok(receipt) => {
                info!(%media_id, publish_id = ?receipt.publish_id, "Draft submitted for publication");
                PublishStatus::Submitted(receipt)
            }
            Err(err) => {
                warn!(%media_id, error = %err, "Publish submission failed; draft kept");
                PublishStatus::Failed(err)
            }
        }
    } else {
        PublishStatus::NotRequested
    };

    Ok(PublishOutcome {
        media_id,
        thumb_media_id,
        simulated: false,
        publish,
        article,
    })
}
