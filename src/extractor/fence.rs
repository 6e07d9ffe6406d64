//! Fenced code block scanning.

/// A fenced code block located in the concatenated line list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// Index of the opening fence line
    pub open_line: usize,
    /// Index of the closing fence line
    pub close_line: usize,
    /// Lowercased language tag from the info string, empty when absent
    pub language: String,
    /// Body lines with the opening fence's indentation removed
    pub body: Vec<&'a str>,
}

impl FencedBlock<'_> {
    /// Body joined with `\n`, trailing newlines stripped.
    pub fn content(&self) -> String {
        join_lines(&self.body)
    }
}

pub(crate) fn join_lines(lines: &[&str]) -> String {
    lines
        .join("\n")
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

#[derive(Debug, Clone, Copy)]
struct Fence<'a> {
    marker: u8,
    width: usize,
    indent: usize,
    info: &'a str,
}

fn parse_opening(line: &str) -> Option<Fence<'_>> {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();
    let marker = *trimmed.as_bytes().first()?;

    if marker != b'`' && marker != b'~' {
        return None;
    }

    let width = trimmed.bytes().take_while(|b| *b == marker).count();
    if width < 3 {
        return None;
    }

    let info = trimmed[width..].trim();
    // ```inline``` on one line is not a fence
    if marker == b'`' && info.contains('`') {
        return None;
    }

    Some(Fence {
        marker,
        width,
        indent,
        info,
    })
}

fn is_closing(line: &str, fence: &Fence<'_>) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= fence.width && trimmed.bytes().all(|b| b == fence.marker)
}

fn language_tag(info: &str) -> String {
    info.trim_start_matches(['{', '.'])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '#'))
        .collect::<String>()
        .to_lowercase()
}

fn strip_indent(line: &str, indent: usize) -> &str {
    let removable = line
        .bytes()
        .take(indent)
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &line[removable..]
}

/// Find every terminated fenced block, in order. An opening fence without a
/// matching close is ignored and scanning resumes on the following line.
pub fn scan_fenced_blocks<'a>(lines: &[&'a str]) -> Vec<FencedBlock<'a>> {
    let mut blocks = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        if let Some(fence) = parse_opening(lines[index]) {
            let closing = lines[index + 1..]
                .iter()
                .position(|line| is_closing(line, &fence));

            if let Some(offset) = closing {
                let close_line = index + 1 + offset;
                blocks.push(FencedBlock {
                    open_line: index,
                    close_line,
                    language: language_tag(fence.info),
                    body: lines[index + 1..close_line]
                        .iter()
                        .map(|line| strip_indent(line, fence.indent))
                        .collect(),
                });
                index = close_line + 1;
                continue;
            }

            log::trace!("unterminated fence on line {}", index + 1);
        }
        index += 1;
    }

    blocks
}
