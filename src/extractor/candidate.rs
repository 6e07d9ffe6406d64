use super::patterns::Pattern;
use serde::Serialize;
use std::collections::HashMap;

/// A file recovered from the markdown, ready to be materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCandidate {
    /// Relative, forward-slash path
    pub path: String,
    pub extension: String,
    pub content: String,
    /// Fence language tag, empty when the block had none
    pub language: String,
    pub pattern: Pattern,
    /// Document the surviving definition came from
    pub origin: String,
    /// Index of the block where this path first appeared
    pub source_order: usize,
}

/// Path-keyed candidates in first-appearance order, where a later insert for
/// the same path replaces the earlier definition in place.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: Vec<FileCandidate>,
    index: HashMap<String, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition that was replaced, if any.
    pub fn insert(&mut self, candidate: FileCandidate) -> Option<FileCandidate> {
        match self.index.get(&candidate.path) {
            Some(&slot) => {
                let source_order = self.entries[slot].source_order;
                let previous = std::mem::replace(
                    &mut self.entries[slot],
                    FileCandidate {
                        source_order,
                        ..candidate
                    },
                );
                Some(previous)
            }
            None => {
                self.index
                    .insert(candidate.path.clone(), self.entries.len());
                self.entries.push(candidate);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileCandidate> {
        self.index.get(path).map(|&slot| &self.entries[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileCandidate> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<FileCandidate> {
        self.entries
    }
}

impl FromIterator<FileCandidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = FileCandidate>>(iter: I) -> Self {
        let mut set = Self::new();
        for candidate in iter {
            set.insert(candidate);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str, content: &str, source_order: usize) -> FileCandidate {
        FileCandidate {
            path: path.to_string(),
            extension: path.rsplit('.').next().unwrap_or_default().to_string(),
            content: content.to_string(),
            language: String::new(),
            pattern: Pattern::AnnotatedHeader,
            origin: "doc.md".to_string(),
            source_order,
        }
    }

    #[test]
    fn test_insert_new_paths() {
        let mut set = CandidateSet::new();
        assert!(set.insert(candidate("a.ts", "a", 0)).is_none());
        assert!(set.insert(candidate("b.ts", "b", 1)).is_none());
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_last_definition_wins_in_place() {
        let mut set = CandidateSet::new();
        set.insert(candidate("a.ts", "old", 0));
        set.insert(candidate("b.ts", "b", 1));

        let mut replacement = candidate("a.ts", "new", 2);
        replacement.pattern = Pattern::PathComment;
        replacement.origin = "later.md".to_string();
        let previous = set.insert(replacement).unwrap();

        assert_eq!(previous.content, "old");
        assert_eq!(set.len(), 2);

        let current = set.get("a.ts").unwrap();
        assert_eq!(current.content, "new");
        assert_eq!(current.pattern, Pattern::PathComment);
        assert_eq!(current.origin, "later.md");
        assert_eq!(current.source_order, 0);

        let order: Vec<&str> = set.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(order, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn test_collect_from_iterator() {
        let set: CandidateSet = vec![
            candidate("x.js", "1", 0),
            candidate("x.js", "2", 1),
            candidate("x.js", "3", 2),
        ]
        .into_iter()
        .collect();

        let entries = set.into_vec();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "3");
    }
}
