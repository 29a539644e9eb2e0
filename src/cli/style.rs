use indicatif::{ProgressFinish, ProgressStyle};

pub mod parse {
    use super::*;

    pub fn with_progress() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} [{elapsed_precise}] {msg}")
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈✔")
            .on_finish(ProgressFinish::AndLeave)
    }
}

pub mod run {
    use super::*;

    /// Bins scored so far, the message holds the current contig.
    pub fn running() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {msg:>8} {bar:50.green/white} {pos}/{len} bins ({per_sec}, ETA {eta})")
            .progress_chars("=> ")
            .on_finish(ProgressFinish::AndLeave)
    }

    pub fn finished() -> ProgressStyle {
        ProgressStyle::default_bar().template("[{elapsed_precise}] ✔ {msg}").on_finish(ProgressFinish::AndLeave)
    }
}
