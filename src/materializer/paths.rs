use crate::error::{Md2ProjectError, Result};
use std::path::{Component, Path, PathBuf};

#[cfg(windows)]
const MAX_PATH: usize = 260;

#[cfg(not(windows))]
const MAX_PATH: usize = 4096;

const INVALID_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

/// Re-check a candidate path before it touches the filesystem and turn it
/// into a relative `PathBuf` made only of normal components.
pub fn relative_destination(path: &str) -> Result<PathBuf> {
    let relative = Path::new(path);

    if path.is_empty() {
        return Err(Md2ProjectError::InvalidPath {
            path: "empty destination path".to_string(),
        });
    }

    let mut destination = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| Md2ProjectError::InvalidPath {
                    path: format!("Non UTF-8 path segment in {}", path),
                })?;
                validate_segment(segment)?;
                destination.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(Md2ProjectError::InvalidPath {
                    path: format!("Directory traversal not allowed: {}", path),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Md2ProjectError::InvalidPath {
                    path: format!("Absolute paths are not allowed: {}", path),
                });
            }
        }
    }

    if destination.as_os_str().is_empty() {
        return Err(Md2ProjectError::InvalidPath {
            path: format!("No file name in {}", path),
        });
    }

    Ok(destination)
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment
        .chars()
        .any(|c| INVALID_CHARS.contains(&c) || c.is_control())
    {
        return Err(Md2ProjectError::InvalidPath {
            path: format!("Filename contains invalid characters: {}", segment),
        });
    }

    // problematic on Windows
    if segment.ends_with(' ') || segment.ends_with('.') {
        return Err(Md2ProjectError::InvalidPath {
            path: format!("Filename cannot end with space or dot: {}", segment),
        });
    }

    #[cfg(windows)]
    {
        const RESERVED: [&str; 22] = [
            "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
            "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8",
            "LPT9",
        ];
        let upper = segment.to_uppercase();
        let base = upper.split('.').next().unwrap_or(&upper);
        if RESERVED.contains(&base) {
            return Err(Md2ProjectError::InvalidPath {
                path: format!("Reserved filename on Windows: {}", segment),
            });
        }
    }

    Ok(())
}

pub fn check_path_length(path: &Path) -> Result<()> {
    let length = path.as_os_str().len();
    if length > MAX_PATH {
        return Err(Md2ProjectError::InvalidPath {
            path: format!("Path too long: {} characters (max: {})", length, MAX_PATH),
        });
    }
    Ok(())
}
