use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// Row progress for the classification stage. Hidden when stderr is not a
/// terminal so piped runs stay clean.
pub fn row_progress() -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .expect("template is compile-time constant")
            .progress_chars("█▓▒░  "),
    );
    pb.set_message("Processing rows...");
    pb
}
