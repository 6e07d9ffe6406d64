use crate::materializer::WriteProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn create_write_progress(&self, total_files: u64) -> ProgressBar {
        if !self.enabled || total_files == 0 {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_files);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} files {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Writing files...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn update_write_progress(pb: &ProgressBar, progress: &WriteProgress) {
    pb.set_position(progress.files_processed as u64);

    match progress.current_file {
        Some(ref current_file) => pb.set_message(current_file.clone()),
        None => pb.set_message("Writing files..."),
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_manager_creation() {
        assert!(ProgressManager::new(true).is_enabled());
        assert!(!ProgressManager::new(false).is_enabled());
    }

    #[test]
    fn test_disabled_or_empty_progress_is_hidden() {
        assert!(ProgressManager::new(false).create_write_progress(10).is_hidden());
        assert!(ProgressManager::new(true).create_write_progress(0).is_hidden());
    }

    #[test]
    fn test_update_write_progress() {
        let pb = ProgressBar::hidden();
        pb.set_length(4);

        let mut progress = WriteProgress::new(4, 100);
        progress.update_file("src/app.ts", 40);
        update_write_progress(&pb, &progress);

        assert_eq!(pb.position(), 1);
        assert_eq!(pb.message(), "src/app.ts");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "61m 1s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
