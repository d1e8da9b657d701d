//! Benchmark support for tabular-data readers and writers.
//!
//! Every reader/writer benchmark runs against a coupled source/sink pair so
//! the same benchmark body can target a file, a host buffer, device memory,
//! or a discard-only sink (see [`source_sink`]). The [`selection`] and
//! [`segments`] helpers keep inputs comparable across schemas and split
//! files into chunks for segmented read benchmarks.

use std::process::Command;
use std::sync::LazyLock;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub mod bench_run;
pub mod cache;
pub mod device;
pub mod display;
pub mod measurements;
pub mod segments;
pub mod selection;
pub mod source_sink;

#[macro_export]
macro_rules! feature_flagged_allocator {
    () => {
        cfg_if::cfg_if! {
            if #[cfg(feature = "mimalloc")] {
                #[global_allocator]
                static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
            } else if #[cfg(feature = "jemalloc")] {
                #[global_allocator]
                static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;
            }
        }
    };
}

pub fn setup_logger(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_level(true)
        .with_line_number(true)
        .with_env_filter(filter)
        .init();
}

pub fn default_env_filter(is_verbose: bool) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_e) => {
            let default_level = if is_verbose {
                LevelFilter::TRACE
            } else {
                LevelFilter::INFO
            };

            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy()
        }
    }
}

pub static GIT_COMMIT_ID: LazyLock<String> = LazyLock::new(|| {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|commit| commit.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
});
