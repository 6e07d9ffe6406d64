use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "md2project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create project files from code blocks in Markdown documents")]
#[command(
    long_about = "md2project reads Markdown documents, finds fenced code blocks annotated \
                       with a file path and writes them out as a project tree. When the same \
                       path appears more than once the last block wins."
)]
#[command(before_help = "🚀 md2project - Markdown to Project Generator")]
#[command(after_help = "EXAMPLES:\n  \
    md2project answer.md\n  \
    md2project part1.md part2.md --output my-app\n  \
    md2project docs/ --dry-run\n  \
    cat answer.md | md2project - --extensions ts,tsx,json\n  \
    md2project answer.md --config md2project.toml --no-overwrite")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Markdown files or directories to read (`-` reads stdin)
    #[arg(required_unless_present = "generate_config")]
    pub markdown_files: Vec<PathBuf>,

    /// Output directory (defaults to the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File extensions to accept (comma-separated)
    #[arg(
        long,
        value_parser = parse_extension_list,
        help = "File extensions to accept (e.g., ts,tsx,json,md)"
    )]
    pub extensions: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Keep files that already exist in the output directory
    #[arg(long, help = "Skip files that already exist instead of overwriting them")]
    pub no_overwrite: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be created without writing)
    #[arg(long, help = "Show the files that would be created without writing them")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_extensions(self.extensions.clone())
            .with_output_dir(self.output.clone())
            .with_no_overwrite(self.no_overwrite)
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_format.into()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Normalizes `"TS, .tsx,json"` to `"ts,tsx,json"`.
pub fn parse_extension_list(s: &str) -> std::result::Result<String, String> {
    let mut extensions: Vec<String> = Vec::new();

    for raw in s.split(',') {
        let extension = raw.trim().trim_start_matches('.').to_lowercase();
        if extension.is_empty() {
            continue;
        }
        if !extension.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(format!("Invalid extension: {}", raw.trim()));
        }
        if !extensions.contains(&extension) {
            extensions.push(extension);
        }
    }

    if extensions.is_empty() {
        return Err("At least one extension is required".to_string());
    }

    Ok(extensions.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_for(files: &[&str]) -> Cli {
        Cli {
            markdown_files: files.iter().map(PathBuf::from).collect(),
            output: None,
            extensions: None,
            config: None,
            output_format: OutputFormat::Human,
            no_overwrite: false,
            verbose: 0,
            quiet: false,
            dry_run: false,
            generate_config: false,
        }
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "md2project",
            "a.md",
            "b.md",
            "-o",
            "out",
            "--dry-run",
            "-vv",
            "--output-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.markdown_files, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(cli.dry_run);
        assert_eq!(cli.verbosity_level(), 2);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn test_inputs_required_unless_generating_config() {
        assert!(Cli::try_parse_from(["md2project", "--dry-run"]).is_err());

        let cli = Cli::try_parse_from(["md2project", "--generate-config"]).unwrap();
        assert!(cli.generate_config);
        assert!(cli.markdown_files.is_empty());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["md2project", "a.md", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_parse_extension_list() {
        assert_eq!(parse_extension_list("TS, .tsx,json").unwrap(), "ts,tsx,json");
        assert_eq!(parse_extension_list("md,md").unwrap(), "md");
        assert!(parse_extension_list(" , ").is_err());
        assert!(parse_extension_list("ts,../x").is_err());
    }

    #[test]
    fn test_cli_overrides_applied() {
        let mut cli = cli_for(&["a.md"]);
        cli.output = Some(PathBuf::from("generated"));
        cli.extensions = Some("rs,toml".to_string());
        cli.no_overwrite = true;

        let config = cli.load_config().unwrap();
        assert_eq!(config.output.base_directory, PathBuf::from("generated"));
        assert_eq!(config.extraction.extensions, vec!["rs", "toml"]);
        assert!(!config.output.overwrite);
    }

    #[test]
    fn test_verbosity() {
        let mut cli = cli_for(&["a.md"]);
        assert!(!cli.is_verbose());

        cli.verbose = 1;
        assert!(cli.is_verbose());

        cli.quiet = true;
        assert!(!cli.is_verbose());
        assert_eq!(cli.verbosity_level(), 0);
    }
}
