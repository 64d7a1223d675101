//! Markdown to HTML.
//!
//! CommonMark plus tables and footnotes. Every heading gets a slug `id`, and a
//! paragraph holding only `[TOC]` becomes a nested list of links to them.

use std::collections::HashSet;

use maud::{Markup, html};
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

pub const TOC_MARKER: &str = "[TOC]";

#[derive(Debug, Clone, PartialEq, Eq)]
struct TocEntry {
    depth: u8,
    id: String,
    text: String,
    children: Vec<TocEntry>,
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options).collect();
    let headings = assign_heading_ids(&mut events);
    let toc = toc_markup(&nest(headings)).into_string();
    let events = expand_toc_markers(events, &toc);

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut rendered, events.into_iter());
    rendered
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

enum HeadingStep {
    Open(u8),
    Text(String),
    Close,
    Other,
}

/// Fills in a unique `id` on every heading and returns them in document order.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut used = HashSet::new();
    let mut headings = Vec::new();
    let mut open: Option<(usize, u8)> = None;
    let mut text = String::new();

    for idx in 0..events.len() {
        let step = match &events[idx] {
            Event::Start(Tag::Heading { level, .. }) => HeadingStep::Open(heading_depth(*level)),
            Event::Text(t) | Event::Code(t) if open.is_some() => HeadingStep::Text(t.to_string()),
            Event::End(TagEnd::Heading(_)) => HeadingStep::Close,
            _ => HeadingStep::Other,
        };

        match step {
            HeadingStep::Open(depth) => {
                open = Some((idx, depth));
                text.clear();
            }
            HeadingStep::Text(fragment) => text.push_str(&fragment),
            HeadingStep::Close => {
                let Some((start, depth)) = open.take() else {
                    continue;
                };
                let id = unique_slug(&mut used, &slugify(&text));
                if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[start] {
                    *slot = Some(CowStr::from(id.clone()));
                }
                headings.push(TocEntry {
                    depth,
                    id,
                    text: text.trim().to_string(),
                    children: Vec::new(),
                });
            }
            HeadingStep::Other => {}
        }
    }

    headings
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

fn unique_slug(used: &mut HashSet<String>, slug: &str) -> String {
    let mut candidate = slug.to_string();
    let mut suffix = 1usize;
    while used.contains(&candidate) {
        candidate = format!("{slug}_{suffix}");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn nest(flat: Vec<TocEntry>) -> Vec<TocEntry> {
    fn insert(nodes: &mut Vec<TocEntry>, entry: TocEntry) {
        match nodes.last_mut() {
            Some(last) if entry.depth > last.depth => insert(&mut last.children, entry),
            _ => nodes.push(entry),
        }
    }

    let mut roots = Vec::new();
    for entry in flat {
        insert(&mut roots, entry);
    }
    roots
}

fn toc_markup(entries: &[TocEntry]) -> Markup {
    html! {
        div class="toc" {
            @if !entries.is_empty() {
                (toc_list(entries))
            }
        }
    }
}

fn toc_list(entries: &[TocEntry]) -> Markup {
    html! {
        ul {
            @for entry in entries {
                li {
                    a href=(format!("#{}", entry.id)) { (entry.text) }
                    @if !entry.children.is_empty() {
                        (toc_list(&entry.children))
                    }
                }
            }
        }
    }
}

/// Index of the closing event when `events[start..]` is a paragraph made only of the marker.
fn toc_marker_end(events: &[Event<'_>], start: usize) -> Option<usize> {
    if !matches!(events[start], Event::Start(Tag::Paragraph)) {
        return None;
    }
    let mut text = String::new();
    for (offset, event) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == TOC_MARKER).then_some(start + 1 + offset);
            }
            _ => return None,
        }
    }
    None
}

fn expand_toc_markers<'a>(events: Vec<Event<'a>>, toc: &str) -> Vec<Event<'a>> {
    let mut spans = Vec::new();
    let mut idx = 0;
    while idx < events.len() {
        match toc_marker_end(&events, idx) {
            Some(end) => {
                spans.push((idx, end));
                idx = end + 1;
            }
            None => idx += 1,
        }
    }

    if spans.is_empty() {
        return events;
    }

    let mut spans = spans.into_iter().peekable();
    let mut expanded = Vec::with_capacity(events.len());
    for (idx, event) in events.into_iter().enumerate() {
        match spans.peek().copied() {
            Some((start, end)) if idx >= start => {
                if idx == start {
                    expanded.push(Event::Html(CowStr::from(format!("{toc}\n"))));
                }
                if idx == end {
                    spans.next();
                }
            }
            _ => expanded.push(event),
        }
    }
    expanded
}
