use serde::Serialize;

/// Text placed between documents when they are concatenated for scanning.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// One markdown input, kept in the order it was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownDocument {
    pub origin: String,
    pub text: String,
}

impl MarkdownDocument {
    pub fn new<O: Into<String>, T: Into<String>>(origin: O, text: T) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// All documents joined with [`DOCUMENT_SEPARATOR`], remembering which line
/// each document starts on.
pub(crate) struct Concatenation<'a> {
    text: String,
    starts: Vec<(usize, &'a str)>,
}

impl<'a> Concatenation<'a> {
    pub(crate) fn new(documents: &'a [MarkdownDocument]) -> Self {
        let capacity = documents
            .iter()
            .map(|d| d.text.len() + DOCUMENT_SEPARATOR.len())
            .sum();
        let mut text = String::with_capacity(capacity);
        let mut starts = Vec::with_capacity(documents.len());
        let mut newlines = 0;

        for document in documents {
            text.push_str(DOCUMENT_SEPARATOR);
            newlines += DOCUMENT_SEPARATOR.matches('\n').count();
            starts.push((newlines, document.origin.as_str()));

            text.push_str(&document.text);
            newlines += document.text.matches('\n').count();
        }

        Self { text, starts }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Origin of the document containing `line` (0-based).
    pub(crate) fn origin_of(&self, line: usize) -> &'a str {
        let index = self.starts.partition_point(|(start, _)| *start <= line);
        index
            .checked_sub(1)
            .map(|i| self.starts[i].1)
            .unwrap_or_default()
    }
}
