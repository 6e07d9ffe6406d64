use thiserror::Error;

#[derive(Error, Debug)]
pub enum Md2ProjectError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input not found: {path}")]
    InputNotFound { path: String },

    #[error("None of the markdown inputs could be read")]
    NoInputReadable { failures: Vec<String> },

    #[error("No files found in markdown")]
    NoFilesFound { documents_scanned: usize },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Md2ProjectError {
    fn user_message(&self) -> String {
        match self {
            Md2ProjectError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            Md2ProjectError::InputNotFound { path } => {
                format!("Markdown input does not exist: {}", path)
            }
            Md2ProjectError::NoInputReadable { failures } => {
                format!(
                    "Could not read any markdown input ({} failed): {}",
                    failures.len(),
                    failures.join("; ")
                )
            }
            Md2ProjectError::NoFilesFound { documents_scanned } => {
                format!(
                    "No files found in {} markdown document(s). Check the format.",
                    documents_scanned
                )
            }
            Md2ProjectError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            Md2ProjectError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            Md2ProjectError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Md2ProjectError::Config { .. } => Some(
                "Check your configuration file syntax, or run with --generate-config to start from a sample.".to_string()
            ),
            Md2ProjectError::InputNotFound { .. } | Md2ProjectError::NoInputReadable { .. } => Some(
                "Pass existing markdown files or directories, or '-' to read from stdin.".to_string()
            ),
            Md2ProjectError::NoFilesFound { .. } => Some(
                "Annotate each code block with its path: a **bold** or heading line such as '### src/app.ts', a `path.ext` line, or a '// path.ext' comment as the first line of the block.".to_string()
            ),
            Md2ProjectError::Permission { .. } => Some(
                "Ensure you have write permissions for the output directory.".to_string()
            ),
            Md2ProjectError::Cancelled => Some(
                "Files written before the interruption were kept. Re-run to finish the remaining files.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Md2ProjectError {
    fn from(error: toml::de::Error) -> Self {
        Md2ProjectError::Config {
            message: error.to_string(),
        }
    }
}

impl From<walkdir::Error> for Md2ProjectError {
    fn from(error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match error.into_io_error() {
            Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                Md2ProjectError::Permission { path }
            }
            Some(io) => Md2ProjectError::Io(io),
            None => Md2ProjectError::InvalidPath {
                path: format!("{} (filesystem loop)", path),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Md2ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = Md2ProjectError::NoFilesFound {
            documents_scanned: 2,
        };
        assert!(error.user_message().contains("2 markdown document(s)"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error = Md2ProjectError::from(io);
        assert!(matches!(error, Md2ProjectError::Io(_)));
        assert!(error.suggestion().is_none());
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse_error = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let error = Md2ProjectError::from(parse_error);
        assert!(matches!(error, Md2ProjectError::Config { .. }));
    }
}
