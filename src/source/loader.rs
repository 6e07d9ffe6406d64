use crate::config::InputConfig;
use crate::error::{Md2ProjectError, Result};
use crate::extractor::MarkdownDocument;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Input argument that reads markdown from standard input.
pub const STDIN_INPUT: &str = "-";

/// An input that could not be read. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub input: String,
    pub reason: String,
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.input, self.reason)
    }
}

#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<MarkdownDocument>,
    pub failures: Vec<LoadFailure>,
}

impl LoadedDocuments {
    pub fn total_chars(&self) -> usize {
        self.documents.iter().map(MarkdownDocument::char_count).sum()
    }
}

pub struct DocumentLoader {
    markdown_extensions: Vec<String>,
    exclude_dirs: Vec<String>,
    max_depth: usize,
}

impl DocumentLoader {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            markdown_extensions: config
                .markdown_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_dirs: config
                .exclude_dirs
                .iter()
                .map(|dir| dir.to_lowercase())
                .collect(),
            max_depth: config.max_depth,
        }
    }

    /// Read every input in argument order. Directories expand to their
    /// markdown files sorted by relative path. Fails only when nothing at
    /// all could be read.
    pub fn load<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<LoadedDocuments> {
        let mut loaded = LoadedDocuments::default();

        for input in inputs {
            let input = input.as_ref();

            let result = if input.as_os_str() == STDIN_INPUT {
                self.read_stdin().map(|document| vec![document])
            } else if input.is_dir() {
                self.load_directory(input, &mut loaded.failures)
            } else {
                self.load_file(input).map(|document| vec![document])
            };

            match result {
                Ok(documents) => loaded.documents.extend(documents),
                Err(err) => {
                    log::warn!("skipping {}: {}", input.display(), err);
                    loaded.failures.push(LoadFailure {
                        input: input.display().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if loaded.documents.is_empty() {
            return Err(Md2ProjectError::NoInputReadable {
                failures: loaded.failures.iter().map(ToString::to_string).collect(),
            });
        }

        Ok(loaded)
    }

    pub fn load_file(&self, path: &Path) -> Result<MarkdownDocument> {
        if !path.exists() {
            return Err(Md2ProjectError::InputNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => Md2ProjectError::Permission {
                path: path.display().to_string(),
            },
            _ => Md2ProjectError::Io(e),
        })?;

        Ok(MarkdownDocument::new(
            path.display().to_string(),
            decode(bytes, &path.display().to_string()),
        ))
    }

    /// Read a document from any reader, e.g. piped input.
    pub fn load_reader<R: Read>(&self, origin: &str, mut reader: R) -> Result<MarkdownDocument> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(MarkdownDocument::new(origin, decode(bytes, origin)))
    }

    fn read_stdin(&self) -> Result<MarkdownDocument> {
        self.load_reader("<stdin>", std::io::stdin().lock())
    }

    fn load_directory(
        &self,
        root: &Path,
        failures: &mut Vec<LoadFailure>,
    ) -> Result<Vec<MarkdownDocument>> {
        let files = self.collect_markdown_files(root, failures);

        if files.is_empty() {
            return Err(Md2ProjectError::InputNotFound {
                path: format!(
                    "{} contains no .{} files",
                    root.display(),
                    self.markdown_extensions.join("/.")
                ),
            });
        }

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            match self.load_file(&file) {
                Ok(document) => documents.push(document),
                Err(err) => {
                    log::warn!("skipping {}: {}", file.display(), err);
                    failures.push(LoadFailure {
                        input: file.display().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(documents)
    }

    fn collect_markdown_files(&self, root: &Path, failures: &mut Vec<LoadFailure>) -> Vec<PathBuf> {
        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.should_traverse(entry));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_markdown_file(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => {
                    let err = Md2ProjectError::from(err);
                    log::warn!("directory scan error under {}: {}", root.display(), err);
                    failures.push(LoadFailure {
                        input: root.display().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        // relative path order, independent of walk order
        files.sort_by(|a, b| a.strip_prefix(root).ok().cmp(&b.strip_prefix(root).ok()));
        files
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let name = entry.file_name().to_string_lossy().to_lowercase();
        !name.starts_with('.') && !self.exclude_dirs.contains(&name)
    }

    pub fn is_markdown_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.markdown_extensions.contains(&ext.to_lowercase()))
    }
}

fn decode(bytes: Vec<u8>, origin: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{} is not valid UTF-8; invalid bytes were replaced", origin);
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn loader() -> DocumentLoader {
        DocumentLoader::new(&InputConfig::default())
    }

    #[test]
    fn test_load_files_in_argument_order() {
        let temp_dir = TempDir::new().unwrap();
        let second = temp_dir.path().join("b.md");
        let first = temp_dir.path().join("a.md");
        fs::write(&second, "second").unwrap();
        fs::write(&first, "first").unwrap();

        let loaded = loader().load(&[&second, &first]).unwrap();

        let texts: Vec<&str> = loaded.documents.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert!(loaded.failures.is_empty());
        assert_eq!(loaded.total_chars(), 11);
    }

    #[test]
    fn test_missing_input_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("present.md");
        fs::write(&present, "# hi").unwrap();
        let missing = temp_dir.path().join("missing.md");

        let loaded = loader().load(&[&missing, &present]).unwrap();

        assert_eq!(loaded.documents.len(), 1);
        assert_eq!(loaded.failures.len(), 1);
        assert!(loaded.failures[0].input.ends_with("missing.md"));
    }

    #[test]
    fn test_nothing_readable_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.md");

        let result = loader().load(&[&missing]);
        match result {
            Err(Md2ProjectError::NoInputReadable { failures }) => assert_eq!(failures.len(), 1),
            other => panic!("unexpected result: {:?}", other.map(|l| l.documents.len())),
        }
    }

    #[test]
    fn test_directory_expansion() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("docs/part2")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();

        fs::write(root.join("docs/b.md"), "b").unwrap();
        fs::write(root.join("docs/a.markdown"), "a").unwrap();
        fs::write(root.join("docs/part2/c.mdx"), "c").unwrap();
        fs::write(root.join("docs/notes.txt"), "ignored").unwrap();
        fs::write(root.join("node_modules/pkg/README.md"), "ignored").unwrap();
        fs::write(root.join(".hidden/secret.md"), "ignored").unwrap();

        let loaded = loader().load(&[root]).unwrap();
        let texts: Vec<&str> = loaded.documents.iter().map(|d| d.text.as_str()).collect();

        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_directory_is_a_failure() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.md");
        let empty = temp_dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        fs::write(&file, "x").unwrap();

        let loaded = loader().load(&[&empty, &file]).unwrap();
        assert_eq!(loaded.documents.len(), 1);
        assert_eq!(loaded.failures.len(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_read_lossily() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.md");
        fs::write(&path, b"caf\xe9 ```").unwrap();

        let document = loader().load_file(&path).unwrap();
        assert!(document.text.starts_with("caf"));
        assert!(document.text.ends_with("```"));
    }

    #[test]
    fn test_load_reader() {
        let document = loader()
            .load_reader("<stdin>", Cursor::new("**a.ts**\n```ts\nx\n```"))
            .unwrap();
        assert_eq!(document.origin, "<stdin>");
        assert!(document.text.contains("a.ts"));
    }

    #[test]
    fn test_markdown_extension_matching() {
        let loader = loader();
        assert!(loader.is_markdown_file(Path::new("README.MD")));
        assert!(loader.is_markdown_file(Path::new("guide.mdx")));
        assert!(!loader.is_markdown_file(Path::new("notes.txt")));
        assert!(!loader.is_markdown_file(Path::new("Makefile")));
    }
}
