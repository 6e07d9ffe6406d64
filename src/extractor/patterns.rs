//! Annotation styles that attach a file path to a fenced block.

use super::fence::{join_lines, FencedBlock};
use super::ExtractionRules;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static PATH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_.\-/\\@~+]+").unwrap());

static REFERENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\[[^\]]*\]\s*)+$").unwrap());

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+(?P<text>.+?)\s*#*\s*$").unwrap());

// **text** or __text__, optional reference/colon, optional trailing `code`.
static EMPHASIZED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:[-*+]\s+|\d+[.)]\s+)?(?:\*\*(?P<star>.+?)\*\*|__(?P<under>.+?)__)\s*(?:\[[^\]]*\])?\s*:?\s*(?:`(?P<code>[^`]+)`\s*(?:\[[^\]]*\])?\s*:?)?\s*$",
    )
    .unwrap()
});

static BACKTICK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*?\s)?`(?P<path>[^`\s]+)`\s*(?:\[[^\]]*\])?\s*:?\s*$").unwrap()
});

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

static FILE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:file(?:name)?|path)\s*:\s*").unwrap());

/// A fenced block together with the line that may annotate it.
#[derive(Debug, Clone, Copy)]
pub struct BlockSite<'a> {
    pub annotation: Option<&'a str>,
    pub block: &'a FencedBlock<'a>,
}

/// Unfiltered `(path, content)` pair produced by a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    /// `**src/App.tsx**` or `### src/App.tsx` above the block
    AnnotatedHeader,
    /// `// src/App.tsx` as the first line inside the block
    PathComment,
    /// `` `src/App.tsx` `` above the block
    BacktickPath,
}

impl Pattern {
    /// Priority order; the first pattern that matches claims the block.
    pub const CASCADE: [Pattern; 3] = [
        Pattern::AnnotatedHeader,
        Pattern::PathComment,
        Pattern::BacktickPath,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::AnnotatedHeader => "annotated-header",
            Pattern::PathComment => "path-comment",
            Pattern::BacktickPath => "backtick-path",
        }
    }

    pub fn try_match(&self, site: &BlockSite<'_>, rules: &ExtractionRules) -> Option<RawMatch> {
        match self {
            Pattern::AnnotatedHeader => match_annotated_header(site, rules),
            Pattern::PathComment => match_path_comment(site.block),
            Pattern::BacktickPath => match_backtick_path(site, rules),
        }
    }
}

/// Nearest non-blank line above `open_line`, skipping lines that hold only
/// bracketed references such as `[1]`.
pub fn preceding_annotation<'a>(lines: &[&'a str], open_line: usize) -> Option<&'a str> {
    lines[..open_line.min(lines.len())]
        .iter()
        .rev()
        .find(|line| !line.trim().is_empty() && !REFERENCE_LINE.is_match(line))
        .copied()
}

/// A token names a file when its last segment has an extension starting
/// with a letter, or is a dotfile such as `.env`.
pub fn is_path_like(token: &str) -> bool {
    let name = token.rsplit(['/', '\\']).next().unwrap_or(token);

    let extension = match name.strip_prefix('.') {
        Some(rest) if !rest.contains('.') => rest,
        _ => match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => return false,
        },
    };

    let mut chars = extension.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric())
}

fn is_bare_token(text: &str) -> bool {
    !text.is_empty()
        && PATH_TOKEN
            .find(text)
            .is_some_and(|m| m.start() == 0 && m.end() == text.len())
        && is_path_like(text)
}

fn path_tokens(text: &str) -> impl Iterator<Item = &str> {
    PATH_TOKEN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.'))
        .filter(|token| is_path_like(token))
}

fn too_long(line: &str, rules: &ExtractionRules) -> bool {
    line.trim().chars().count() > rules.max_annotation_length()
}

fn annotation_text(line: &str) -> Option<String> {
    if let Some(caps) = EMPHASIZED_LINE.captures(line) {
        let emphasized = caps.name("star").or_else(|| caps.name("under"))?.as_str();
        return Some(match caps.name("code") {
            Some(code) => format!("{} `{}`", emphasized, code.as_str()),
            None => emphasized.to_string(),
        });
    }

    HEADING
        .captures(line)
        .and_then(|caps| caps.name("text"))
        .map(|text| text.as_str().to_string())
}

/// Last token with a supported extension. In multi-word text only tokens
/// with a directory part or inside a code span count, so prose such as
/// "Configuring Next.js" names no file. A text that is nothing but one
/// path-like token is returned as-is so the filter can report it.
fn pick_path(text: &str, rules: &ExtractionRules) -> Option<String> {
    let quoted: Vec<&str> = CODE_SPAN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect();

    let cleaned = REFERENCE.replace_all(&text.replace('`', ""), " ").into_owned();
    let cleaned = cleaned.trim().trim_end_matches(':').trim();
    let cleaned = FILE_LABEL.replace(cleaned, "");
    let cleaned = cleaned.trim();
    let prose = cleaned.split_whitespace().nth(1).is_some();

    let supported = path_tokens(cleaned)
        .filter(|token| !prose || token.contains(['/', '\\']) || quoted.contains(token))
        .filter(|token| {
            super::filter::extension_of(token).is_some_and(|ext| rules.supports_extension(&ext))
        });
    if let Some(path) = supported.last() {
        return Some(path.to_string());
    }

    is_bare_token(cleaned).then(|| cleaned.to_string())
}

fn match_annotated_header(site: &BlockSite<'_>, rules: &ExtractionRules) -> Option<RawMatch> {
    let line = site.annotation?;
    if too_long(line, rules) {
        return None;
    }

    let text = annotation_text(line)?;
    let path = pick_path(&text, rules)?;

    Some(RawMatch {
        path,
        content: site.block.content(),
    })
}

fn comment_text(line: &str) -> Option<&str> {
    let line = line.trim();

    if let Some(inner) = line.strip_prefix("<!--") {
        return inner.strip_suffix("-->").map(str::trim);
    }
    if let Some(inner) = line.strip_prefix("/*") {
        return inner.strip_suffix("*/").map(str::trim);
    }
    if line.starts_with("#!") {
        return None;
    }

    ["//", "--", "#", ";"]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

fn match_path_comment(block: &FencedBlock<'_>) -> Option<RawMatch> {
    if block.language.is_empty() {
        return None;
    }

    let text = comment_text(block.body.first()?)?;
    let unlabeled = FILE_LABEL.replace(text, "");
    let token = unlabeled.trim().trim_matches('`');

    if !is_bare_token(token) {
        return None;
    }

    Some(RawMatch {
        path: token.to_string(),
        content: join_lines(&block.body[1..]),
    })
}

fn match_backtick_path(site: &BlockSite<'_>, rules: &ExtractionRules) -> Option<RawMatch> {
    let line = site.annotation?;
    if too_long(line, rules) {
        return None;
    }

    let path = BACKTICK_LINE.captures(line)?.name("path")?.as_str();
    if !is_bare_token(path) {
        return None;
    }

    Some(RawMatch {
        path: path.to_string(),
        content: site.block.content(),
    })
}
