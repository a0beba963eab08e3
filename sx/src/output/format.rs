//! Result formatting shared by every writer
//!
//! Writers only decide how a [`Style`] looks; the layout of a result page
//! lives here so terminal, plain and file output stay identical apart from
//! color.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{json, Map, Value};
use sx_search::SearchResult;

use super::ResultPage;

/// Words kept from a result snippet
const MAX_CONTENT_WORDS: usize = 128;
const MAX_TITLE_CHARS: usize = 70;
const LINE_WIDTH: usize = 80;
const INDENT: &str = "     ";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

/// Visual role of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Query,
    Index,
    Title,
    Domain,
    Dim,
}

/// Render a page of results as lines of text
pub fn page_lines(page: &ResultPage, paint: &dyn Fn(Style, &str) -> String) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("Query: {}", paint(Style::Query, &page.query)),
        String::new(),
    ];

    for (offset, result) in page.results.iter().enumerate() {
        let index = page.start_at + offset + 1;

        lines.push(format!(
            " {} {} {}",
            paint(Style::Index, &format!("{:>2}.", index)),
            paint(Style::Title, &truncate_title(result.display_title())),
            paint(Style::Domain, &format!("[{}]", extract_domain(&result.url))),
        ));

        if page.expand && result.has_url() {
            lines.push(format!("{}{}", INDENT, result.url));
        }

        if !result.content.is_empty() {
            let content = format_content(&result.content);
            for line in wrap_text(&content, LINE_WIDTH - INDENT.len()) {
                lines.push(format!("{}{}", INDENT, line));
            }
        }

        for line in category_lines(result) {
            lines.push(format!("{}{}", INDENT, paint(Style::Dim, &line)));
        }

        if let Some(engines) = engines_line(result) {
            lines.push(format!("{}{}", INDENT, paint(Style::Dim, &engines)));
        }

        lines.push(String::new());
    }

    lines
}

/// Host part of a URL, without parsing it strictly
pub fn extract_domain(url: &str) -> &str {
    let rest = match url.split_once("//") {
        Some((_, rest)) => rest,
        None => url,
    };
    rest.split('/').next().unwrap_or_default()
}

pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

/// Strip markup from a snippet and cap its length
pub fn format_content(content: &str) -> String {
    let stripped = TAG_RE.replace_all(content, "");
    let text = unescape_html(&stripped);

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > MAX_CONTENT_WORDS {
        format!("{} ...", words[..MAX_CONTENT_WORDS].join(" "))
    } else {
        words.join(" ")
    }
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Greedy word wrap
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = if width == 0 { LINE_WIDTH } else { width };
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Extra lines for categories that carry more than a snippet
fn category_lines(result: &SearchResult) -> Vec<String> {
    let attrs = &result.attributes;
    let mut lines = Vec::new();

    match result.category.as_deref().unwrap_or_default() {
        "news" | "social media" => {
            if let Some(date) = attrs.published_date.as_deref().and_then(format_date) {
                lines.push(date);
            }
        }
        "images" => {
            let resolution = attrs.resolution.as_deref().unwrap_or_default();
            let source = attrs.source.as_deref().unwrap_or_default();
            if !resolution.is_empty() || !source.is_empty() {
                lines.push(format!("{} {}", resolution, source).trim().to_string());
            }
            if let Some(img) = attrs.img_src.as_deref().filter(|s| !s.is_empty()) {
                lines.push(img.to_string());
            }
        }
        "videos" | "music" => {
            let parts: Vec<String> = [
                attrs.length.as_ref().and_then(format_length),
                attrs.author.clone().filter(|a| !a.is_empty()),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !parts.is_empty() {
                lines.push(parts.join(" "));
            }
        }
        "map" => {
            if let Some(address) = &attrs.address {
                lines.extend(address_lines(address));
            }
            let lat = attrs.latitude.unwrap_or_default();
            let lon = attrs.longitude.unwrap_or_default();
            if lat != 0.0 || lon != 0.0 {
                lines.push(format!("{:.6}, {:.6}", lat, lon));
            }
        }
        "science" => {
            let parts: Vec<String> = [
                attrs.published_date.as_deref().and_then(format_date),
                attrs.journal.clone().filter(|j| !j.is_empty()),
                attrs.publisher.clone().filter(|p| !p.is_empty()),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !parts.is_empty() {
                lines.push(parts.join(" "));
            }
        }
        "files" => match attrs.template.as_deref() {
            Some("torrent.html") => {
                if let Some(magnet) = attrs.magnetlink.as_deref().filter(|m| !m.is_empty()) {
                    lines.push(magnet.to_string());
                }
                lines.push(format!(
                    "{} ↑{} seeders, ↓{} leechers",
                    attrs.filesize.as_deref().unwrap_or_default(),
                    attrs.seed.unwrap_or_default(),
                    attrs.leech.unwrap_or_default()
                ));
            }
            Some("files.html") => {
                lines.push(format!(
                    "{} {}",
                    attrs.size.as_deref().unwrap_or_default(),
                    attrs.metadata.as_deref().unwrap_or_default()
                ));
            }
            _ => {}
        },
        _ => {}
    }

    lines
}

fn address_lines(address: &Map<String, Value>) -> Vec<String> {
    let field = |key: &str| {
        address
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    let mut lines = Vec::new();

    let street: Vec<&str> = [field("house_number"), field("road")]
        .into_iter()
        .flatten()
        .collect();
    if !street.is_empty() {
        lines.push(street.join(" "));
    }

    let city: Vec<&str> = [field("locality"), field("postcode")]
        .into_iter()
        .flatten()
        .collect();
    if !city.is_empty() {
        lines.push(city.join(", "));
    }

    if let Some(country) = field("country") {
        lines.push(country.to_string());
    }

    lines
}

/// Media length as `MM:SS` from seconds, or the string as sent
fn format_length(length: &Value) -> Option<String> {
    match length {
        Value::Number(n) => {
            let secs = n.as_f64()? as u64;
            Some(format!("{:02}:{:02}", secs / 60, secs % 60))
        }
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn format_date(date: &str) -> Option<String> {
    parse_date(date).map(|d| d.format("%B %-d, %Y").to_string())
}

/// Parse the date formats engines commonly send
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, format) {
            return Some(dt.date());
        }
    }

    ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"]
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

/// `[engine, other engines...]` with the primary engine first
fn engines_line(result: &SearchResult) -> Option<String> {
    let mut names: Vec<&str> = Vec::new();
    if !result.engine.is_empty() {
        names.push(&result.engine);
    }
    for engine in &result.engines {
        if !engine.is_empty() && !names.contains(&engine.as_str()) {
            names.push(engine);
        }
    }

    (!names.is_empty()).then(|| format!("[{}]", names.join(", ")))
}

/// `{"query": ..., "results": [...]}` pretty-printed
///
/// The clean form drops empty strings, zeros, nulls and empty collections
/// from every result.
pub fn results_json(
    query: &str,
    results: &[SearchResult],
    clean: bool,
) -> serde_json::Result<String> {
    let results: Vec<Value> = results
        .iter()
        .map(|r| {
            let value = serde_json::to_value(r)?;
            Ok(if clean { clean_value(value) } else { value })
        })
        .collect::<serde_json::Result<_>>()?;

    serde_json::to_string_pretty(&json!({
        "query": query,
        "results": results,
    }))
}

fn clean_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !is_empty_value(v))
                .collect(),
        ),
        other => other,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) => false,
    }
}
