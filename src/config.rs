use crate::error::{Md2ProjectError, Result};
use crate::extractor::{
    CommandPolicy, ExtractionRules, DEFAULT_COMMAND_VERBS, DEFAULT_EXTENSIONS,
    DEFAULT_PROMPT_PREFIXES, DEFAULT_SHELL_LANGUAGES, DEFAULT_SHELL_OPERATORS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Extensions picked up when a directory is passed as input
    pub markdown_extensions: Vec<String>,
    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub extensions: Vec<String>,
    pub max_annotation_length: usize,
    pub commands: CommandConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandConfig {
    pub shell_languages: Vec<String>,
    pub command_verbs: Vec<String>,
    pub shell_operators: Vec<String>,
    pub prompt_prefixes: Vec<String>,
    pub sample_lines: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_directory: PathBuf,
    pub overwrite: bool,
    /// Append a final newline to non-empty files
    pub trailing_newline: bool,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            markdown_extensions: owned(&["md", "markdown", "mdx"]),
            exclude_dirs: owned(&["node_modules", "target", "dist", "build", "vendor"]),
            max_depth: 10,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extensions: owned(DEFAULT_EXTENSIONS),
            max_annotation_length: 160,
            commands: CommandConfig::default(),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            shell_languages: owned(DEFAULT_SHELL_LANGUAGES),
            command_verbs: owned(DEFAULT_COMMAND_VERBS),
            shell_operators: owned(DEFAULT_SHELL_OPERATORS),
            prompt_prefixes: owned(DEFAULT_PROMPT_PREFIXES),
            sample_lines: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("."),
            overwrite: true,
            trailing_newline: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Md2ProjectError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Md2ProjectError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Md2ProjectError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["md2project.toml", ".md2project.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extensions) = cli_args.extensions {
            self.extraction.extensions = extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.base_directory = output_dir.clone();
        }

        if cli_args.no_overwrite {
            self.output.overwrite = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| Md2ProjectError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| Md2ProjectError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.extensions.is_empty() {
            return Err(Md2ProjectError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.extraction.max_annotation_length == 0 {
            return Err(Md2ProjectError::Config {
                message: "Maximum annotation length must be greater than 0".to_string(),
            });
        }

        if self.extraction.commands.sample_lines == 0 {
            return Err(Md2ProjectError::Config {
                message: "Command sample lines must be greater than 0".to_string(),
            });
        }

        if self.input.markdown_extensions.is_empty() {
            return Err(Md2ProjectError::Config {
                message: "At least one markdown extension must be specified".to_string(),
            });
        }

        if self.input.max_depth == 0 {
            return Err(Md2ProjectError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if self.output.base_directory.as_os_str().is_empty() {
            return Err(Md2ProjectError::Config {
                message: "Output directory must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Immutable rule set handed to the extractor.
    pub fn extraction_rules(&self) -> ExtractionRules {
        let commands = &self.extraction.commands;
        ExtractionRules::new(
            self.extraction.extensions.iter().cloned(),
            CommandPolicy {
                shell_languages: commands.shell_languages.clone(),
                command_verbs: commands.command_verbs.clone(),
                shell_operators: commands.shell_operators.clone(),
                prompt_prefixes: commands.prompt_prefixes.clone(),
                sample_lines: commands.sample_lines,
            },
        )
        .with_max_annotation_length(self.extraction.max_annotation_length)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extensions: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub no_overwrite: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: Option<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_no_overwrite(mut self, no_overwrite: bool) -> Self {
        self.no_overwrite = no_overwrite;
        self
    }
}
