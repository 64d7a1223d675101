use std::net::SocketAddr;

use clap::Parser;
use mpdraft_cli::cli_args::{Cli, Command, ConfigCommand, PreviewFormat};
use mpdraft_cli::preview;
use mpdraft_core::ArticleStyle;
use mpdraft_core::wechat::DEFAULT_API_BASE;

// Integration tests for argument parsing and the offline preview command.

#[test]
fn test_no_subcommand_means_serve() {
    let cli = Cli::try_parse_from(["mpdraft"]).expect("parse");
    assert!(cli.command.is_none());
    assert!(cli.config.is_none());
}

#[test]
fn test_serve_defaults() {
    let cli = Cli::try_parse_from(["mpdraft", "serve"]).expect("parse");
    let Some(Command::Serve(args)) = cli.command else {
        panic!("expected serve");
    };
    assert_eq!(args.bind, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
    assert_eq!(args.api_base, DEFAULT_API_BASE);
    assert!(!args.log_file);
}

#[test]
fn test_serve_overrides() {
    let cli = Cli::try_parse_from([
        "mpdraft",
        "serve",
        "--bind",
        "127.0.0.1:9000",
        "--api-base",
        "http://localhost:1234",
        "--log-file",
        "--config",
        "/tmp/mpdraft.json",
    ])
    .expect("parse");
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/mpdraft.json"))
    );
    let Some(Command::Serve(args)) = cli.command else {
        panic!("expected serve");
    };
    assert_eq!(args.bind.port(), 9000);
    assert_eq!(args.api_base, "http://localhost:1234");
    assert!(args.log_file);
}

#[test]
fn test_preview_arguments() {
    let cli = Cli::try_parse_from([
        "mpdraft",
        "preview",
        "--title",
        "Hello",
        "--style",
        "popular-science",
        "--paragraphs",
        "-3",
        "--toc",
        "--format",
        "html",
    ])
    .expect("parse");
    let Some(Command::Preview(args)) = cli.command else {
        panic!("expected preview");
    };
    assert_eq!(args.title, "Hello");
    assert_eq!(args.style, ArticleStyle::PopularScience);
    assert_eq!(args.paragraphs, Some(-3));
    assert!(args.toc);
    assert_eq!(args.format, PreviewFormat::Html);
}

#[test]
fn test_preview_requires_title() {
    assert!(Cli::try_parse_from(["mpdraft", "preview"]).is_err());
}

#[test]
fn test_preview_rejects_unknown_style() {
    assert!(Cli::try_parse_from(["mpdraft", "preview", "--title", "T", "--style", "poetry"]).is_err());
}

#[test]
fn test_config_set_parses_simulate_flag() {
    let cli = Cli::try_parse_from([
        "mpdraft",
        "config",
        "set",
        "--appid",
        "wx1",
        "--appsecret",
        "s",
        "--simulate",
        "false",
    ])
    .expect("parse");
    let Some(Command::Config(ConfigCommand::Set(args))) = cli.command else {
        panic!("expected config set");
    };
    assert_eq!(args.appid, "wx1");
    assert!(!args.simulate);
}

#[test]
fn test_preview_markdown_output() {
    let cli = Cli::try_parse_from([
        "mpdraft",
        "preview",
        "--title",
        "Hello",
        "--keywords",
        "x, y",
        "--paragraphs",
        "1",
    ])
    .expect("parse");
    let Some(Command::Preview(args)) = cli.command else {
        panic!("expected preview");
    };

    let output = preview(&args).expect("preview");
    assert!(output.starts_with("# Hello\n"));
    assert!(output.contains("### Section 2"));
    assert!(!output.contains("### Section 3"));
    assert!(output.ends_with('\n'));
}

#[test]
fn test_preview_html_output_has_toc() {
    let cli = Cli::try_parse_from([
        "mpdraft", "preview", "--title", "Hello", "--toc", "--format", "html",
    ])
    .expect("parse");
    let Some(Command::Preview(args)) = cli.command else {
        panic!("expected preview");
    };

    let output = preview(&args).expect("preview");
    assert!(output.contains(r#"<div class="toc">"#));
    assert!(output.contains(r#"<h1 id="hello">Hello</h1>"#));
}

#[test]
fn test_preview_blank_title_fails() {
    let cli = Cli::try_parse_from(["mpdraft", "preview", "--title", "  "]).expect("parse");
    let Some(Command::Preview(args)) = cli.command else {
        panic!("expected preview");
    };
    assert!(preview(&args).is_err());
}
