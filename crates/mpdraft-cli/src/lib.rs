//! Command-line front end: starts the web UI or runs one-off generator and settings commands.

pub mod cli_args;

use anyhow::{Context, Result};
use clap::Parser;
use mpdraft_core::{
    ArticleRequest, ConfigStore, FileConfig, LoggingDestination, WeChatClient, init_logging,
    render_article,
};
use mpdraft_web::AppState;
use tracing::info;

use crate::cli_args::{
    Cli, Command, ConfigCommand, ConfigSetArgs, PreviewArgs, PreviewFormat, ServeArgs,
};

/// Parse process arguments and run the selected command.
pub async fn run() -> Result<()> {
    dispatch(Cli::parse()).await
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let store = cli.config.map(ConfigStore::new).unwrap_or_default();
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(store, args).await,
        Command::Preview(args) => {
            print!("{}", preview(&args)?);
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            print!("{}", show_config(&store));
            Ok(())
        }
        Command::Config(ConfigCommand::Set(args)) => {
            let saved = set_config(&store, &args)?;
            println!(
                "Saved {} (simulate = {})",
                store.path().display(),
                saved.simulate
            );
            Ok(())
        }
    }
}

async fn serve(store: ConfigStore, args: ServeArgs) -> Result<()> {
    let destination = if args.log_file {
        LoggingDestination::FileAndStderr
    } else {
        LoggingDestination::StderrOnly
    };
    init_logging(destination).context("failed to initialise logging")?;

    let loaded = store.load();
    info!(
        path = %store.path().display(),
        source = ?loaded.source,
        simulate = loaded.config.simulate,
        "Configuration loaded"
    );

    let state = AppState::new(store, WeChatClient::new(args.api_base));
    mpdraft_web::serve(args.bind, state).await
}

pub fn preview(args: &PreviewArgs) -> Result<String> {
    let request = ArticleRequest {
        title: args.title.clone(),
        keywords: args.keywords.clone(),
        summary: args.summary.clone(),
        style: args.style,
        paragraphs: args.paragraphs,
        toc: args.toc,
    };
    let article = render_article(&request)?;
    let mut output = match args.format {
        PreviewFormat::Markdown => article.markdown,
        PreviewFormat::Html => article.html,
    };
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        "*".repeat(secret.chars().count().min(8))
    }
}

pub fn show_config(store: &ConfigStore) -> String {
    let loaded = store.load();
    let FileConfig {
        appid,
        appsecret,
        simulate,
    } = &loaded.config;
    let mut out = String::new();
    for warning in &loaded.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out.push_str(&format!("path: {}\n", store.path().display()));
    out.push_str(&format!(
        "appid: {}\n",
        if appid.is_empty() { "(not set)" } else { appid }
    ));
    out.push_str(&format!("appsecret: {}\n", mask(appsecret)));
    out.push_str(&format!("simulate: {simulate}\n"));
    out
}

pub fn set_config(store: &ConfigStore, args: &ConfigSetArgs) -> Result<FileConfig> {
    store
        .save(&args.appid, &args.appsecret, args.simulate)
        .with_context(|| format!("failed to write {}", store.path().display()))
}
