//! HTML views.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use mpdraft_core::generator::{DEFAULT_PARAGRAPHS, MAX_PARAGRAPHS, MIN_PARAGRAPHS};
use mpdraft_core::{ArticleStyle, FileConfig, PublishOutcome, PublishReceipt, RenderedArticle};

use crate::forms::ArticleForm;

const STYLESHEET: &str = r#"
body { font-family: -apple-system, "Segoe UI", "PingFang SC", sans-serif; margin: 0; background: #f6f7f9; color: #1f2328; }
main { max-width: 880px; margin: 0 auto; padding: 24px; }
section { background: #fff; border: 1px solid #d8dee4; border-radius: 8px; padding: 16px 20px; margin-bottom: 20px; }
label { display: block; margin: 8px 0 4px; font-weight: 600; }
input[type=text], input[type=password], input[type=number], textarea, select { width: 100%; box-sizing: border-box; padding: 6px 8px; }
label.inline { display: inline-flex; gap: 6px; font-weight: normal; margin-right: 16px; }
button { margin-top: 12px; margin-right: 8px; padding: 8px 16px; }
.badge { display: inline-block; padding: 2px 8px; border-radius: 10px; background: #fff3cd; color: #7a5d00; font-size: 0.85em; }
.ok { color: #1a7f37; }
.fail { color: #cf222e; }
.warning { color: #7a5d00; }
pre { background: #f6f8fa; padding: 12px; overflow-x: auto; white-space: pre-wrap; }
.rendered { border-top: 1px dashed #d8dee4; margin-top: 12px; padding-top: 12px; }
"#;

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · mpdraft" }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                main {
                    h1 { "WeChat article drafts" }
                    (body)
                }
            }
        }
    }
}

fn simulate_badge(simulate: bool) -> Markup {
    html! {
        @if simulate {
            span class="badge" { "Simulate mode: no requests are sent to WeChat" }
        }
    }
}

fn style_options(selected: ArticleStyle) -> Markup {
    html! {
        @for style in ArticleStyle::ALL {
            option value=(style.as_str()) selected[style == selected] { (style.label()) }
        }
    }
}

fn article_fields(form: &ArticleForm) -> Markup {
    let paragraphs = form
        .paragraphs
        .clone()
        .unwrap_or_else(|| DEFAULT_PARAGRAPHS.to_string());
    html! {
        label for="title" { "Title" }
        input type="text" id="title" name="title" required value=(form.title);
        label for="keywords" { "Keywords (comma separated)" }
        input type="text" id="keywords" name="keywords" value=(form.keywords);
        label for="summary" { "Summary" }
        textarea id="summary" name="summary" rows="3" { (form.summary) }
        label for="author" { "Author" }
        input type="text" id="author" name="author" value=(form.author);
        label for="style" { "Style" }
        select id="style" name="style" { (style_options(form.style())) }
        label for="paragraphs" { "Sections (" (MIN_PARAGRAPHS) "–" (MAX_PARAGRAPHS) ")" }
        input type="number" id="paragraphs" name="paragraphs" min=(MIN_PARAGRAPHS) max=(MAX_PARAGRAPHS) value=(paragraphs);
        label class="inline" {
            input type="checkbox" name="toc" value="on" checked[form.toc()];
            "Table of contents"
        }
        label class="inline" {
            input type="checkbox" name="auto_publish" value="on" checked[form.auto_publish()];
            "Submit for publication after the draft is created"
        }
    }
}

pub fn index(config: &FileConfig, warnings: &[String]) -> Markup {
    layout(
        "Home",
        html! {
            section {
                h2 { "Account settings" }
                @for warning in warnings {
                    p class="warning" { (warning) }
                }
                form method="post" action="/save-config" {
                    label for="appid" { "AppID" }
                    input type="text" id="appid" name="appid" value=(config.appid);
                    label for="appsecret" { "AppSecret" }
                    input type="password" id="appsecret" name="appsecret" value=(config.appsecret);
                    label class="inline" {
                        input type="checkbox" name="simulate" value="on" checked[config.simulate];
                        "Simulate mode"
                    }
                    button type="submit" { "Save settings" }
                }
                (simulate_badge(config.simulate))
            }
            section {
                h2 { "Generate article" }
                form method="post" action="/generate-upload" enctype="multipart/form-data" {
                    (article_fields(&ArticleForm::default()))
                    label for="cover_image" { "Cover image (JPG/PNG, required outside simulate mode)" }
                    input type="file" id="cover_image" name="cover_image" accept="image/jpeg,image/png";
                    button type="submit" { "Generate and upload draft" }
                    button type="submit" formaction="/preview" formenctype="application/x-www-form-urlencoded" { "Preview only" }
                }
            }
        },
    )
}

fn receipt_block(receipt: &PublishReceipt) -> Markup {
    let pretty = serde_json::to_string_pretty(receipt).unwrap_or_default();
    html! {
        h3 { "Publish task" }
        pre { (pretty) }
    }
}

pub fn publish_success(outcome: &PublishOutcome) -> Markup {
    let class = if outcome.is_partial() { "warning" } else { "ok" };
    layout(
        "Result",
        html! {
            section {
                h2 class=(class) { (outcome.message()) }
                (simulate_badge(outcome.simulated))
                dl {
                    dt { "Draft media_id" }
                    dd { code { (outcome.media_id) } }
                    dt { "Cover thumb_media_id" }
                    dd { code { (outcome.thumb_media_id) } }
                }
                @if let Some(receipt) = outcome.receipt() {
                    (receipt_block(receipt))
                }
                p { a href="/" { "Back" } }
            }
        },
    )
}

pub fn publish_failure(message: &str) -> Markup {
    layout(
        "Result",
        html! {
            section {
                h2 class="fail" { "Draft was not created" }
                p { (message) }
                p { a href="/" { "Back" } }
            }
        },
    )
}

pub fn preview(form: &ArticleForm, simulate: bool, article: &RenderedArticle) -> Markup {
    layout(
        "Preview",
        html! {
            section {
                h2 { "Preview" }
                (simulate_badge(simulate))
                form method="post" action="/generate-upload" enctype="multipart/form-data" {
                    (article_fields(form))
                    label for="cover_image" { "Cover image" }
                    input type="file" id="cover_image" name="cover_image" accept="image/jpeg,image/png";
                    button type="submit" { "Generate and upload draft" }
                    button type="submit" formaction="/preview" formenctype="application/x-www-form-urlencoded" { "Refresh preview" }
                }
            }
            section {
                h3 { "Markdown" }
                pre { (article.markdown) }
                h3 { "Rendered" }
                div class="rendered" { (PreEscaped(&article.html)) }
            }
        },
    )
}

pub fn error_page(status: u16, message: &str) -> Markup {
    layout(
        "Error",
        html! {
            section {
                h2 class="fail" { "Request rejected (" (status) ")" }
                p { (message) }
                p { a href="/" { "Back" } }
            }
        },
    )
}
