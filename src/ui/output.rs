use crate::error::{Md2ProjectError, UserFriendlyError};
use crate::extractor::Extraction;
use crate::materializer::{MaterializePlan, MaterializeReport};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static PACKAGE: Emoji = Emoji("📦 ", "");
static FOLDER: Emoji = Emoji("📁 ", "+ ");
static FILE: Emoji = Emoji("📄 ", "- ");
static CHART: Emoji = Emoji("📊 ", "");
static SEARCH: Emoji = Emoji("🔍 ", "");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &Md2ProjectError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!("{}{}", INFO, style(format!("Suggestion: {}", suggestion)).cyan());
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
            }
        }
    }

    pub fn print_banner(&self) {
        if self.mode != OutputMode::Human || self.quiet {
            return;
        }

        println!("{}", "=".repeat(70));
        if self.use_colors {
            println!(
                "{}{}",
                PACKAGE,
                style("Markdown to Project Structure").bold().cyan()
            );
        } else {
            println!("Markdown to Project Structure");
        }
        println!("{}", "=".repeat(70));
        println!();
    }

    pub fn document_read(&self, origin: &str, characters: usize) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                let message = format!("Read {} ({} characters)", origin, characters);
                if self.use_colors {
                    println!("{}{}", style("✓ ").green(), message);
                } else {
                    println!("✓ {}", message);
                }
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "document",
                "origin": origin,
                "characters": characters,
            })),
            OutputMode::Plain => println!("READ: {} ({} characters)", origin, characters),
        }
    }

    pub fn print_extraction_summary(&self, extraction: &Extraction) {
        match self.mode {
            OutputMode::Human => self.print_human_extraction(extraction),
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "extraction",
                "files": extraction.candidates.len(),
                "blocks_scanned": extraction.blocks_scanned,
                "superseded": extraction.superseded,
                "rejections": extraction.rejections,
            })),
            OutputMode::Plain => {
                if !self.quiet {
                    println!("FOUND: {} files", extraction.candidates.len());
                }
            }
        }

        for rejection in &extraction.rejections {
            self.debug(&format!(
                "skipped {} ({}, {}) from {}",
                rejection.path,
                rejection.reason,
                rejection.pattern.name(),
                rejection.origin
            ));
        }
    }

    pub fn print_plan(&self, plan: &MaterializePlan) {
        match self.mode {
            OutputMode::Human => self.print_human_plan(plan),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                for file in &plan.files {
                    println!("{}", file.path);
                }
            }
        }

        for rejected in &plan.rejected {
            self.warning(&format!("{}: {}", rejected.path, rejected.message));
        }
    }

    pub fn print_report(&self, report: &MaterializeReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(70)).dim());
                } else {
                    println!("{}", "-".repeat(70));
                }
            }
            OutputMode::Plain => println!("{}", "-".repeat(70)),
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn emphasize(&self, value: impl ToString) -> String {
        if self.use_colors {
            style(value.to_string()).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }

    fn print_human_extraction(&self, extraction: &Extraction) {
        println!();
        println!(
            "{}Analysis complete: Found {} files",
            CHART,
            self.emphasize(extraction.candidates.len())
        );

        if self.quiet {
            return;
        }

        if extraction.superseded > 0 {
            self.info(&format!(
                "{} later definition(s) replaced earlier ones",
                extraction.superseded
            ));
        }
        if !extraction.rejections.is_empty() {
            self.info(&format!(
                "{} annotated block(s) skipped (run with -vv for details)",
                extraction.rejections.len()
            ));
        }
        println!();
    }

    fn print_human_plan(&self, plan: &MaterializePlan) {
        if self.quiet {
            for file in &plan.files {
                println!("{}", file.path);
            }
            return;
        }

        println!("Files to be created:");
        for file in &plan.files {
            let marker = if file.exists { " (exists)" } else { "" };
            println!("   {}{} [{}]", file.path, marker, format_bytes(file.bytes));
        }
        println!();

        if !plan.directories.is_empty() {
            println!("Directories:");
            for directory in &plan.directories {
                println!("   {}/", directory);
            }
            println!();
        }

        println!("{}Dry run mode - no files created", SEARCH);
        println!("   Target: {}", plan.root.display());
        if plan.existing_files() > 0 {
            self.warning(&format!(
                "{} file(s) already exist and would be overwritten unless --no-overwrite is set",
                plan.existing_files()
            ));
        }
    }

    fn print_human_report(&self, report: &MaterializeReport) {
        if self.quiet {
            return;
        }

        for directory in &report.directories_created {
            println!("{}Created directory: {}", FOLDER, directory);
        }
        for file in &report.files_written {
            println!("{}Created file: {}", FILE, file);
        }
        for file in &report.files_skipped {
            println!("{}Kept existing file: {}", FILE, file);
        }

        println!();
        println!("{}", "=".repeat(70));
        if report.has_errors() {
            println!(
                "{}Project created with {} error(s)",
                WARNING,
                report.errors.len()
            );
        } else if self.use_colors {
            println!("{}{}", CHECKMARK, style("Project created successfully!").green().bold());
        } else {
            println!("✓ Project created successfully!");
        }
        println!("   Directories: {}", self.emphasize(report.directories_created.len()));
        println!("   Files:       {}", self.emphasize(report.files_written.len()));
        if !report.files_skipped.is_empty() {
            println!("   Kept:        {}", self.emphasize(report.files_skipped.len()));
        }
        println!("   Size:        {}", self.emphasize(format_bytes(report.bytes_written)));
        println!("   Time:        {}", self.emphasize(format_duration(report.duration)));
        println!("   Location:    {}", absolute_display(&report.root));
        println!("{}", "=".repeat(70));

        for error in &report.errors {
            self.error(&format!("{}: {}", error.path, error.message));
        }
    }

    fn print_plain_report(&self, report: &MaterializeReport) {
        if !self.quiet {
            println!("COMPLETED: Project structure");
            println!("Directories: {}", report.directories_created.len());
            println!("Files: {}", report.files_written.len());
            println!("Skipped: {}", report.files_skipped.len());
            println!("Bytes: {}", report.bytes_written);
            println!("Duration: {:?}", report.duration);
            println!("Location: {}", absolute_display(&report.root));
        }
        for error in &report.errors {
            eprintln!("ERROR: {}: {}", error.path, error.message);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn absolute_display(path: &std::path::Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
