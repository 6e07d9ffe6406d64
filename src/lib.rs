pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod materializer;
pub mod source;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractionConfig, InputConfig, OutputConfig};
pub use error::{Md2ProjectError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    CandidateSet, CommandPolicy, Extraction, ExtractionRules, Extractor, FileCandidate,
    MarkdownDocument, Pattern, Rejection, RejectionReason,
};
pub use materializer::{MaterializePlan, MaterializeReport, Materializer, WriteProgress};
pub use source::{DocumentLoader, LoadedDocuments};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Result of a full run: a preview in dry-run mode, otherwise the write report.
#[derive(Debug)]
pub enum RunOutcome {
    Previewed(MaterializePlan),
    Materialized(MaterializeReport),
}

/// Main library interface wiring loader, extractor and materializer together
pub struct Md2Project {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl Md2Project {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(!quiet && output_mode == OutputMode::Human),
            shutdown: GracefulShutdown::default(),
            config,
        }
    }

    /// No signal handler is registered.
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
            config,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;

        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Load, extract, then preview or write.
    pub fn run<P: AsRef<Path>>(&self, inputs: &[P], dry_run: bool) -> Result<RunOutcome> {
        self.output_formatter.print_banner();

        let documents = self.load_documents(inputs)?;
        let extraction = self
            .shutdown
            .with_shutdown_check(|| self.extract(&documents))?;
        self.output_formatter.print_extraction_summary(&extraction);

        let root = self.config.output.base_directory.as_path();

        if dry_run {
            let plan = self.preview(&extraction.candidates, root);
            self.output_formatter.print_plan(&plan);
            return Ok(RunOutcome::Previewed(plan));
        }

        let report = self.materialize(&extraction.candidates, root)?;
        self.output_formatter.print_report(&report);
        Ok(RunOutcome::Materialized(report))
    }

    /// Read every input, reporting unreadable ones without failing.
    pub fn load_documents<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Vec<MarkdownDocument>> {
        let loader = DocumentLoader::new(&self.config.input);
        let loaded = loader.load(inputs)?;

        for failure in &loaded.failures {
            self.output_formatter
                .warning(&format!("Error reading {}", failure));
        }
        for document in &loaded.documents {
            self.output_formatter
                .document_read(&document.origin, document.char_count());
        }

        Ok(loaded.documents)
    }

    pub fn extract(&self, documents: &[MarkdownDocument]) -> Result<Extraction> {
        let extractor = Extractor::new(self.config.extraction_rules());
        let extraction = extractor.extract(documents);

        log::info!(
            "{} candidate(s) from {} block(s), {} rejected, {} superseded",
            extraction.candidates.len(),
            extraction.blocks_scanned,
            extraction.rejections.len(),
            extraction.superseded
        );

        if extraction.is_empty() {
            return Err(Md2ProjectError::NoFilesFound {
                documents_scanned: documents.len(),
            });
        }

        Ok(extraction)
    }

    pub fn preview(&self, candidates: &[FileCandidate], root: &Path) -> MaterializePlan {
        Materializer::from_config(&self.config.output).plan(candidates, root)
    }

    pub fn materialize(&self, candidates: &[FileCandidate], root: &Path) -> Result<MaterializeReport> {
        self.output_formatter
            .start_operation(&format!("Creating project in: {}", root.display()));

        let write_progress = self
            .progress_manager
            .create_write_progress(candidates.len() as u64);
        let progress_callback = {
            let pb = write_progress.clone();
            move |progress: &WriteProgress| {
                ui::progress::update_write_progress(&pb, progress);
            }
        };

        let result = Materializer::from_config(&self.config.output).materialize(
            candidates,
            root,
            Some(&progress_callback),
            Some(&self.shutdown),
        );

        match result {
            Ok(report) => {
                ui::progress::finish_progress_with_summary(
                    &write_progress,
                    &format!("Wrote {} files", report.files_written.len()),
                    report.duration,
                );
                Ok(report)
            }
            Err(err) => {
                write_progress.abandon();
                Err(err)
            }
        }
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &Md2ProjectError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Extract `(path, content)` candidates from markdown texts with the default
/// rules, without touching the filesystem.
pub fn extract_files_from_markdown<S: AsRef<str>>(texts: &[S]) -> Vec<FileCandidate> {
    Extractor::default().extract_texts(texts).candidates
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_in(output: &Path) -> Md2Project {
        let mut config = Config::default();
        config.output.base_directory = output.to_path_buf();
        Md2Project::new_for_test(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_run_materializes_tree() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("guide.md");
        fs::write(
            &doc,
            "**src/App.tsx**\n```tsx\nexport default function App() {}\n```\n",
        )
        .unwrap();
        let output = temp_dir.path().join("out");

        let outcome = project_in(&output).run(&[&doc], false).unwrap();

        match outcome {
            RunOutcome::Materialized(report) => {
                assert_eq!(report.files_written, vec!["src/App.tsx"]);
                assert!(!report.has_errors());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            fs::read_to_string(output.join("src/App.tsx")).unwrap(),
            "export default function App() {}"
        );
    }

    #[test]
    fn test_dry_run_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("guide.md");
        fs::write(&doc, "### a/b.py\n```py\nprint(1)\n```\n").unwrap();
        let output = temp_dir.path().join("out");

        let outcome = project_in(&output).run(&[&doc], true).unwrap();

        assert!(matches!(outcome, RunOutcome::Previewed(ref plan) if plan.files.len() == 1));
        assert!(!output.exists());
    }

    #[test]
    fn test_no_files_found() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("prose.md");
        fs::write(&doc, "# Title\n\nJust prose.\n").unwrap();

        let result = project_in(temp_dir.path()).run(&[&doc], false);
        assert!(matches!(
            result,
            Err(Md2ProjectError::NoFilesFound { documents_scanned: 1 })
        ));
    }

    #[test]
    fn test_cancelled_before_extraction() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("guide.md");
        fs::write(&doc, "### a.ts\n```ts\nx\n```\n").unwrap();

        let project = project_in(&temp_dir.path().join("out"));
        project.request_shutdown();
        assert!(!project.is_running());

        let result = project.run(&[&doc], false);
        assert!(matches!(result, Err(Md2ProjectError::Cancelled)));
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        Md2Project::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extraction]"));
        assert!(content.contains("[output]"));
        assert!(Config::load_from_file(&config_path).is_ok());
    }

    #[test]
    fn test_extract_files_from_markdown() {
        let files = extract_files_from_markdown(&["`.gitignore`\n```\nnode_modules\n```"]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, ".gitignore");
        assert_eq!(files[0].content, "node_modules");
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
