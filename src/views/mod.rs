// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod episode;
mod home;
mod now_playing;

pub use episode::EpisodePage;
pub use home::HomePage;
pub use now_playing::render_player;

use colored::Colorize;
use console::Emoji;
use scraper::{Html, Node};
use tracing::warn;

use crate::error::ApiError;

static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Outcome of a fetch performed by a page.
///
/// Failures are kept as a message and rendered as a banner; they are never
/// retried.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    /// Record a fetch result, logging failures
    pub fn from_result(what: &str, result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => {
                warn!(error = %e, "failed to load {what}");
                Loadable::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            Loadable::Failed(_) => None,
        }
    }
}

/// Banner shown in place of content that failed to load
fn failure_banner(what: &str, reason: &str) -> String {
    format!(
        "{WARNING}{} {}",
        format!("Could not load {what}:").red().bold(),
        reason.dimmed()
    )
}

/// Truncate to at most `max_chars` characters, marking the cut with "..."
fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        title.to_string()
    } else {
        let kept: String = title.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Render an HTML description as plain text
///
/// Text nodes are kept, scripts and styles are dropped, and block elements
/// start a new paragraph. Entities are decoded by the parser.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Element(element) => match element.name() {
                "br" | "li" => text.push('\n'),
                name if is_block(name) => text.push_str("\n\n"),
                _ => {}
            },
            Node::Text(chunk) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|e| matches!(e.name(), "script" | "style"))
                });
                if hidden {
                    continue;
                }

                // Text following a closed block starts its own paragraph
                let after_block = node
                    .prev_sibling()
                    .and_then(|sibling| sibling.value().as_element().map(|e| is_block(e.name())))
                    .unwrap_or(false);
                if after_block {
                    text.push_str("\n\n");
                }
                text.push_str(chunk);
            }
            _ => {}
        }
    }

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        let previous_blank = lines.last().is_some_and(|l| l.is_empty());
        if line.is_empty() && (lines.is_empty() || previous_blank) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre"
    )
}
