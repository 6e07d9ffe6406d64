//! Filtering stage applied to every raw match before it becomes a candidate.

use super::patterns::RawMatch;
use super::{
    ExtractionRules, DEFAULT_COMMAND_VERBS, DEFAULT_PROMPT_PREFIXES, DEFAULT_SHELL_LANGUAGES,
    DEFAULT_SHELL_OPERATORS,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    EmptyPath,
    AbsolutePath,
    Traversal,
    UnsupportedExtension,
    CommandBlock,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectionReason::EmptyPath => "empty path",
            RejectionReason::AbsolutePath => "absolute path",
            RejectionReason::Traversal => "path escapes the output root",
            RejectionReason::UnsupportedExtension => "unsupported extension",
            RejectionReason::CommandBlock => "block looks like a shell command",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Admitted {
    pub path: String,
    pub extension: String,
}

/// Heuristic policy separating shell/installation examples from source files.
///
/// A block is treated as a command example when it is shell-tagged (or
/// untagged but starts with a prompt), does not open with a shebang, and
/// either the file stem is itself a command verb or every sampled line reads
/// like a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPolicy {
    pub shell_languages: Vec<String>,
    pub command_verbs: Vec<String>,
    pub shell_operators: Vec<String>,
    pub prompt_prefixes: Vec<String>,
    pub sample_lines: usize,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            shell_languages: owned(DEFAULT_SHELL_LANGUAGES),
            command_verbs: owned(DEFAULT_COMMAND_VERBS),
            shell_operators: owned(DEFAULT_SHELL_OPERATORS),
            prompt_prefixes: owned(DEFAULT_PROMPT_PREFIXES),
            sample_lines: 5,
        }
    }
}

impl CommandPolicy {
    pub fn is_shell_language(&self, language: &str) -> bool {
        self.shell_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }

    fn has_prompt(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        self.prompt_prefixes
            .iter()
            .any(|p| trimmed.starts_with(p.as_str()) || trimmed == p.trim_end())
    }

    fn is_command_verb(&self, word: &str) -> bool {
        self.command_verbs.iter().any(|v| v == word)
    }

    pub fn looks_like_command_line(&self, line: &str) -> bool {
        let trimmed = line.trim();

        if self.has_prompt(trimmed) {
            return true;
        }
        if trimmed.starts_with('#') && !trimmed.starts_with("#!") {
            return true;
        }
        // `./build.sh` runs a local script
        if trimmed
            .split_whitespace()
            .next()
            .is_some_and(|word| self.is_command_verb(word) || word.starts_with("./"))
        {
            return true;
        }

        self.shell_operators
            .iter()
            .any(|op| trimmed.contains(op.as_str()))
    }

    pub fn is_command_block(&self, language: &str, path: &str, content: &str) -> bool {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let Some(first) = lines.clone().next() else {
            return false;
        };

        let shell_tagged =
            self.is_shell_language(language) || (language.is_empty() && self.has_prompt(first));
        if !shell_tagged || first.trim_start().starts_with("#!") {
            return false;
        }

        if file_stem(path).is_some_and(|stem| self.is_command_verb(stem)) {
            return true;
        }

        lines
            .by_ref()
            .take(self.sample_lines)
            .all(|line| self.looks_like_command_line(line))
    }
}

/// Unify separators, collapse repeated `/` and drop `.` segments.
pub fn normalize_path(raw: &str) -> String {
    let unified = raw.trim().replace('\\', "/");
    let joined = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if unified.starts_with('/') {
        format!("/{}", joined)
    } else {
        joined
    }
}

pub fn check_path(path: &str) -> Result<(), RejectionReason> {
    if path.is_empty() {
        return Err(RejectionReason::EmptyPath);
    }
    if path.starts_with('/') {
        return Err(RejectionReason::AbsolutePath);
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(RejectionReason::Traversal);
    }
    Ok(())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn file_stem(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => Some(stem),
        _ => None,
    }
}

/// Extension of the final path segment, lowercased. Dotfiles without a
/// further dot (`.env`, `.gitignore`) use the name after the leading dot.
pub fn extension_of(path: &str) -> Option<String> {
    let name = file_name(path);

    if let Some(rest) = name.strip_prefix('.') {
        if !rest.is_empty() && !rest.contains('.') {
            return Some(rest.to_lowercase());
        }
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

pub(crate) fn admit(
    raw: &RawMatch,
    language: &str,
    rules: &ExtractionRules,
) -> Result<Admitted, RejectionReason> {
    let path = normalize_path(&raw.path);
    check_path(&path)?;

    let extension = extension_of(&path)
        .filter(|ext| rules.supports_extension(ext))
        .ok_or(RejectionReason::UnsupportedExtension)?;

    if rules
        .commands()
        .is_command_block(language, &path, &raw.content)
    {
        return Err(RejectionReason::CommandBlock);
    }

    Ok(Admitted { path, extension })
}
