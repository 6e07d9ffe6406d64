//! Extraction engine: turns markdown text into `(path, content)` candidates.
//!
//! Every fenced code block is offered to a fixed cascade of annotation
//! patterns. The first pattern that recognizes a path for the block wins, the
//! raw match is filtered (path normalization, traversal guard, extension set,
//! command heuristic), and survivors are folded into a path-keyed set where
//! the last definition of a path wins.

pub mod candidate;
pub mod document;
pub mod fence;
pub mod filter;
pub mod patterns;

pub use candidate::{CandidateSet, FileCandidate};
pub use document::MarkdownDocument;
pub use fence::FencedBlock;
pub use filter::{CommandPolicy, RejectionReason};
pub use patterns::Pattern;

use document::Concatenation;
use patterns::BlockSite;
use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "json", "css", "html", "md", "py", "go", "sh", "yaml", "yml",
    "toml", "txt", "env", "gitignore",
];

pub const DEFAULT_SHELL_LANGUAGES: &[&str] = &[
    "bash",
    "sh",
    "shell",
    "zsh",
    "fish",
    "console",
    "terminal",
    "shellsession",
    "powershell",
    "pwsh",
    "ps1",
    "cmd",
    "bat",
];

pub const DEFAULT_COMMAND_VERBS: &[&str] = &[
    "npm", "npx", "yarn", "pnpm", "bun", "node", "deno", "pip", "pip3", "pipx", "poetry", "uv",
    "python", "python3", "cd", "mkdir", "touch", "cp", "mv", "rm", "ls", "cat", "echo",
    "export", "source", "git", "curl", "wget", "brew", "apt", "apt-get", "sudo", "docker",
    "docker-compose", "kubectl", "cargo", "rustup", "go", "make", "chmod", "gem", "bundle",
    "composer", "bash", "sh", "zsh", "pwsh",
];

pub const DEFAULT_SHELL_OPERATORS: &[&str] = &["&&", "||", " | ", "; ", ">>", "$("];

pub const DEFAULT_PROMPT_PREFIXES: &[&str] = &["$ ", "% ", "> ", "PS> "];

/// Immutable configuration the extractor runs against.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    extensions: BTreeSet<String>,
    commands: CommandPolicy,
    max_annotation_length: usize,
}

impl ExtractionRules {
    pub fn new<I, S>(extensions: I, commands: CommandPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self {
            extensions,
            commands,
            max_annotation_length: 160,
        }
    }

    pub fn with_max_annotation_length(mut self, length: usize) -> Self {
        self.max_annotation_length = length.max(1);
        self
    }

    pub fn supports_extension(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_lowercase())
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn commands(&self) -> &CommandPolicy {
        &self.commands
    }

    pub fn max_annotation_length(&self) -> usize {
        self.max_annotation_length
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter(), CommandPolicy::default())
    }
}

/// A raw match dropped by the filtering stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub path: String,
    pub pattern: Pattern,
    pub reason: RejectionReason,
    pub origin: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub candidates: Vec<FileCandidate>,
    pub rejections: Vec<Rejection>,
    pub blocks_scanned: usize,
    /// Matches that replaced an earlier definition of the same path
    pub superseded: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileCandidate> {
        self.candidates.iter().find(|c| c.path == path)
    }

    /// `(path, content)` pairs in display order, as handed to the materializer.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.candidates
            .iter()
            .map(|c| (c.path.as_str(), c.content.as_str()))
    }
}

pub struct Extractor {
    rules: ExtractionRules,
}

impl Extractor {
    pub fn new(rules: ExtractionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ExtractionRules {
        &self.rules
    }

    pub fn extract(&self, documents: &[MarkdownDocument]) -> Extraction {
        extract(documents, &self.rules)
    }

    pub fn extract_texts<S: AsRef<str>>(&self, texts: &[S]) -> Extraction {
        let documents: Vec<MarkdownDocument> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| MarkdownDocument::new(format!("<input {}>", i + 1), text.as_ref()))
            .collect();
        self.extract(&documents)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractionRules::default())
    }
}

/// Scan the concatenated documents and fold every admitted match into the
/// path-keyed candidate set.
pub fn extract(documents: &[MarkdownDocument], rules: &ExtractionRules) -> Extraction {
    let concatenation = Concatenation::new(documents);
    let lines: Vec<&str> = concatenation.text().lines().collect();
    let blocks = fence::scan_fenced_blocks(&lines);

    let mut candidates = CandidateSet::new();
    let mut rejections = Vec::new();
    let mut superseded = 0;

    for (source_order, block) in blocks.iter().enumerate() {
        let site = BlockSite {
            annotation: patterns::preceding_annotation(&lines, block.open_line),
            block,
        };

        let Some((pattern, raw)) = Pattern::CASCADE
            .iter()
            .find_map(|pattern| pattern.try_match(&site, rules).map(|m| (*pattern, m)))
        else {
            continue;
        };

        let origin = concatenation.origin_of(block.open_line).to_string();

        match filter::admit(&raw, &block.language, rules) {
            Ok(admitted) => {
                log::trace!(
                    "{} matched {} ({} bytes) in {}",
                    pattern.name(),
                    admitted.path,
                    raw.content.len(),
                    origin
                );
                let candidate = FileCandidate {
                    path: admitted.path,
                    extension: admitted.extension,
                    content: raw.content,
                    language: block.language.clone(),
                    pattern,
                    origin,
                    source_order,
                };
                if let Some(previous) = candidates.insert(candidate) {
                    superseded += 1;
                    log::debug!(
                        "{} redefined; keeping the later definition (first seen in {})",
                        previous.path,
                        previous.origin
                    );
                }
            }
            Err(reason) => {
                log::debug!("skipped {} from {}: {}", raw.path, origin, reason);
                rejections.push(Rejection {
                    path: raw.path,
                    pattern,
                    reason,
                    origin,
                });
            }
        }
    }

    Extraction {
        candidates: candidates.into_vec(),
        rejections,
        blocks_scanned: blocks.len(),
        superseded,
    }
}
