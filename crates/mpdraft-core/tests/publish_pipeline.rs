use std::sync::Mutex;

use mpdraft_core::{
    ApiError, ArticleRequest, CoverImage, DraftArticle, FileConfig, Operation, PlatformApi,
    PublishError, PublishReceipt, PublishRequest, PublishStatus, publish, simulated_id,
};

#[derive(Default)]
struct FakePlatform {
    calls: Mutex<Vec<Operation>>,
    drafts: Mutex<Vec<DraftArticle>>,
    failing: Option<Operation>,
}

impl FakePlatform {
    fn failing(operation: Operation) -> Self {
        Self {
            failing: Some(operation),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, operation: Operation, value: &str) -> Result<String, ApiError> {
        self.calls.lock().unwrap().push(operation);
        if self.failing == Some(operation) {
            return Err(ApiError::Rejected {
                operation,
                body: r#"{"errcode":40001,"errmsg":"invalid credential"}"#.to_string(),
            });
        }
        Ok(value.to_string())
    }
}

impl PlatformApi for FakePlatform {
    async fn access_token(&self, appid: &str, appsecret: &str) -> Result<String, ApiError> {
        assert_eq!((appid, appsecret), ("wx-app", "wx-secret"));
        self.respond(Operation::AccessToken, "TOKEN")
    }

    async fn upload_image(&self, access_token: &str, image: &CoverImage) -> Result<String, ApiError> {
        assert_eq!(access_token, "TOKEN");
        assert!(!image.bytes.is_empty());
        self.respond(Operation::UploadImage, "THUMB-1")
    }

    async fn add_draft(&self, access_token: &str, article: &DraftArticle) -> Result<String, ApiError> {
        assert_eq!(access_token, "TOKEN");
        self.drafts.lock().unwrap().push(article.clone());
        self.respond(Operation::AddDraft, "DRAFT-1")
    }

    async fn submit_publish(
        &self,
        access_token: &str,
        media_id: &str,
    ) -> Result<PublishReceipt, ApiError> {
        assert_eq!(access_token, "TOKEN");
        assert_eq!(media_id, "DRAFT-1");
        self.respond(Operation::SubmitPublish, "PUB-1")
            .map(|publish_id| PublishReceipt {
                errcode: 0,
                errmsg: "ok".to_string(),
                publish_id: Some(publish_id),
                msg_data_id: None,
            })
    }
}

fn live_config() -> FileConfig {
    FileConfig::new("wx-app", "wx-secret", false)
}

fn request(title: &str, auto_publish: bool, with_cover: bool) -> PublishRequest {
    PublishRequest {
        article: ArticleRequest::new(title).keywords("rust,wechat").paragraphs(3),
        author: "Ada".to_string(),
        auto_publish,
        cover: with_cover.then(|| CoverImage::new("cover.png", vec![0x89, 0x50, 0x4e, 0x47])),
    }
}

#[tokio::test]
async fn simulate_mode_never_touches_the_network() {
    let api = FakePlatform::default();
    let config = FileConfig::default();

    let outcome = publish(&api, &config, request("X", true, false))
        .await
        .expect("simulate mode succeeds");

    assert!(api.calls().is_empty());
    assert!(outcome.simulated);
    assert_eq!(outcome.media_id, simulated_id("SIM_MEDIA", "XAda"));
    assert_eq!(outcome.thumb_media_id, simulated_id("SIM_THUMB", "X"));
    let receipt = outcome.receipt().expect("simulated receipt");
    assert_eq!(receipt.errcode, 0);
    assert_eq!(
        receipt.publish_id.as_deref(),
        Some(simulated_id("SIM_PUB", &outcome.media_id).as_str())
    );
    assert!(outcome.message().starts_with("[Simulated]"));
}

#[tokio::test]
async fn simulated_media_id_is_stable_across_calls() {
    let api = FakePlatform::default();
    let config = FileConfig::default();

    let first = publish(&api, &config, request("X", false, false)).await.unwrap();
    let second = publish(&api, &config, request("X", false, false)).await.unwrap();

    assert_eq!(first.media_id, second.media_id);
    assert!(matches!(first.publish, PublishStatus::NotRequested));
    assert_eq!(first.message(), "[Simulated] Draft created");
}

#[tokio::test]
async fn simulate_mode_ignores_missing_credentials_and_cover() {
    let api = FakePlatform::default();
    let config = FileConfig {
        appid: String::new(),
        appsecret: String::new(),
        simulate: true,
    };

    let outcome = publish(&api, &config, request("No creds", false, false)).await;
    assert!(outcome.is_ok());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn live_mode_without_credentials_fails_before_any_call() {
    let api = FakePlatform::default();
    let config = FileConfig::new("", "wx-secret", false);

    let err = publish(&api, &config, request("Live", true, true))
        .await
        .expect_err("credentials are required");

    assert!(matches!(err, PublishError::MissingCredentials));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn live_mode_without_cover_never_uploads() {
    let api = FakePlatform::default();

    let err = publish(&api, &live_config(), request("Live", false, false))
        .await
        .expect_err("cover is required");

    assert!(matches!(err, PublishError::MissingCover));
    assert_eq!(api.calls(), vec![Operation::AccessToken]);
}

#[tokio::test]
async fn token_failure_is_terminal() {
    let api = FakePlatform::failing(Operation::AccessToken);

    let err = publish(&api, &live_config(), request("Live", true, true))
        .await
        .expect_err("token failure");

    assert!(matches!(err, PublishError::Token(_)));
    assert!(err.to_string().contains("invalid credential"));
    assert_eq!(api.calls(), vec![Operation::AccessToken]);
}

#[tokio::test]
async fn upload_and_draft_failures_stop_the_pipeline() {
    let api = FakePlatform::failing(Operation::UploadImage);
    let err = publish(&api, &live_config(), request("Live", true, true))
        .await
        .expect_err("upload failure");
    assert!(matches!(err, PublishError::Upload(_)));
    assert_eq!(
        api.calls(),
        vec![Operation::AccessToken, Operation::UploadImage]
    );

    let api = FakePlatform::failing(Operation::AddDraft);
    let err = publish(&api, &live_config(), request("Live", true, true))
        .await
        .expect_err("draft failure");
    assert!(matches!(err, PublishError::Draft(_)));
    assert!(!api.calls().contains(&Operation::SubmitPublish));
}

#[tokio::test]
async fn live_draft_carries_generated_content_and_disabled_comments() {
    let api = FakePlatform::default();

    let outcome = publish(&api, &live_config(), request("Release notes", false, true))
        .await
        .expect("draft created");

    assert_eq!(outcome.media_id, "DRAFT-1");
    assert_eq!(outcome.thumb_media_id, "THUMB-1");
    assert!(!outcome.simulated);
    assert_eq!(outcome.message(), "Draft created");
    assert_eq!(
        api.calls(),
        vec![
            Operation::AccessToken,
            Operation::UploadImage,
            Operation::AddDraft
        ]
    );

    let drafts = api.drafts.lock().unwrap();
    let draft = &drafts[0];
    assert_eq!(draft.title, "Release notes");
    assert_eq!(draft.author, "Ada");
    assert_eq!(draft.digest, "Release notes", "digest falls back to the title");
    assert_eq!(draft.thumb_media_id, "THUMB-1");
    assert_eq!(draft.need_open_comment, 0);
    assert_eq!(draft.only_fans_can_comment, 0);
    assert_eq!(draft.content, outcome.article.html);
    assert!(draft.content.contains(r#"<h1 id="release-notes">Release notes</h1>"#));
}

#[tokio::test]
async fn digest_uses_summary_when_present() {
    let api = FakePlatform::default();
    let mut req = request("Digest", false, true);
    req.article = req.article.summary("A short digest");

    publish(&api, &live_config(), req).await.expect("draft created");

    assert_eq!(api.drafts.lock().unwrap()[0].digest, "A short digest");
}

#[tokio::test]
async fn auto_publish_success_returns_receipt() {
    let api = FakePlatform::default();

    let outcome = publish(&api, &live_config(), request("Live", true, true))
        .await
        .expect("published");

    assert_eq!(
        outcome.receipt().and_then(|r| r.publish_id.as_deref()),
        Some("PUB-1")
    );
    assert_eq!(
        outcome.message(),
        "Draft created and submitted for publication"
    );
}

#[tokio::test]
async fn publish_failure_after_draft_is_partial_success() {
    let api = FakePlatform::failing(Operation::SubmitPublish);

    let outcome = publish(&api, &live_config(), request("Live", true, true))
        .await
        .expect("partial success is not an error");

    assert!(outcome.is_partial());
    assert_eq!(outcome.media_id, "DRAFT-1");
    assert!(outcome.receipt().is_none());
    assert!(outcome.message().contains("media_id=DRAFT-1"));
}

#[tokio::test]
async fn blank_title_is_rejected_in_every_mode() {
    let api = FakePlatform::default();

    let err = publish(&api, &FileConfig::default(), request("  ", false, false))
        .await
        .expect_err("blank title");
    assert!(matches!(err, PublishError::Content(_)));
    assert!(api.calls().is_empty());
}
