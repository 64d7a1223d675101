use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use mpdraft_core::ArticleStyle;
use mpdraft_core::wechat::DEFAULT_API_BASE;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Generate templated articles and publish them as WeChat Official Account drafts.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to the per-user config directory).
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the web UI (default).
    Serve(ServeArgs),
    /// Print a generated article without contacting WeChat.
    Preview(PreviewArgs),
    /// Inspect or change the saved settings.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Base URL of the WeChat API.
    #[arg(long = "api-base", default_value = DEFAULT_API_BASE, value_hint = ValueHint::Url)]
    pub api_base: String,

    /// Also write JSON logs under the config directory.
    #[arg(long, action = ArgAction::SetTrue)]
    pub log_file: bool,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            api_base: DEFAULT_API_BASE.to_string(),
            log_file: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PreviewFormat {
    #[default]
    Markdown,
    Html,
}

#[derive(Debug, Clone, Args)]
pub struct PreviewArgs {
    #[arg(long)]
    pub title: String,

    /// Comma-separated keywords.
    #[arg(long, default_value = "")]
    pub keywords: String,

    #[arg(long, default_value = "")]
    pub summary: String,

    #[arg(long, default_value_t = ArticleStyle::Generic)]
    pub style: ArticleStyle,

    /// Number of body sections; clamped to 2..=12.
    #[arg(long, allow_negative_numbers = true)]
    pub paragraphs: Option<i64>,

    /// Emit a table of contents.
    #[arg(long, action = ArgAction::SetTrue)]
    pub toc: bool,

    #[arg(long, value_enum, default_value_t = PreviewFormat::Markdown)]
    pub format: PreviewFormat,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the settings with the secret masked.
    Show,
    /// Overwrite the settings.
    Set(ConfigSetArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConfigSetArgs {
    #[arg(long, default_value = "")]
    pub appid: String,

    #[arg(long, default_value = "")]
    pub appsecret: String,

    /// Keep all requests local.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub simulate: bool,
}
