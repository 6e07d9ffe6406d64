use clap::Parser;
use md2project::{
    Cli, Md2Project, Md2ProjectError, OutputFormatter, OutputMode, RunOutcome, UserFriendlyError,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(&cli);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let md2project = match Md2Project::from_cli(&cli) {
        Ok(md2project) => md2project,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    match md2project.run(&cli.markdown_files, cli.dry_run) {
        Ok(RunOutcome::Previewed(_)) => 0,
        Ok(RunOutcome::Materialized(report)) => {
            if report.has_errors() {
                2
            } else {
                0
            }
        }
        Err(e) => {
            md2project.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &Md2ProjectError) -> i32 {
    match error {
        Md2ProjectError::Cancelled => 130,
        Md2ProjectError::NoInputReadable { .. } | Md2ProjectError::InputNotFound { .. } => 3,
        Md2ProjectError::NoFilesFound { .. } => 4,
        Md2ProjectError::Permission { .. } => 5,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "md2project.toml".to_string());

    match Md2Project::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  md2project <markdown-files> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &Md2ProjectError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr through `log`; RUST_LOG takes precedence over -q/-v.
fn setup_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}
