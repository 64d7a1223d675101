//! Core library for mpdraft: article generation and the WeChat draft/publish pipeline.

pub mod config;
pub mod generator;
pub mod logging;
pub mod publish;
pub mod render;
pub mod wechat;

pub use config::{
    ConfigError, ConfigLoadResult, ConfigSource, ConfigStore, FileConfig, config_directory,
    config_path,
};
pub use generator::{
    ArticleRequest, ArticleStyle, ContentError, RenderedArticle, clamp_paragraphs,
    generate_markdown, render_article,
};
pub use logging::{LoggingDestination, LoggingError, init_logging};
pub use publish::{
    PublishError, PublishOutcome, PublishRequest, PublishStatus, publish, simulated_id,
};
pub use render::markdown_to_html;
pub use wechat::{
    ApiError, CoverImage, DraftArticle, Operation, PlatformApi, PublishReceipt, WeChatClient,
};
