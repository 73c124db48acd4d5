//! Per-file timing
//!
//! `--profile` wraps every per-file plugin callback in a timer. After the
//! run the collected samples are rendered as a "Profile data:" report on
//! the diagnostic stream: total elapsed, throughput, and the slowest
//! files first.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SLOWEST_SHOWN: usize = 20;

#[derive(Debug)]
struct Sample {
    path: PathBuf,
    elapsed: Duration,
}

/// Collects one timing sample per processed file.
#[derive(Debug, Default)]
pub struct Profiler {
    samples: Vec<Sample>,
    run_started: Option<Instant>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of the whole run, for the total-elapsed figure.
    pub fn begin(&mut self) {
        self.run_started = Some(Instant::now());
    }

    /// Times one per-file callback.
    pub fn time<T>(&mut self, path: &Path, f: impl FnOnce() -> T) -> T {
        let begin = Instant::now();
        let result = f();
        self.samples.push(Sample {
            path: path.to_path_buf(),
            elapsed: begin.elapsed(),
        });
        result
    }

    /// Renders the report. Total elapsed covers the whole run when
    /// [`begin`](Self::begin) was called, otherwise the sum of samples.
    pub fn report(&self) -> String {
        let total = self
            .run_started
            .map(|started| started.elapsed())
            .unwrap_or_else(|| self.samples.iter().map(|s| s.elapsed).sum());

        let count = self.samples.len();
        let per_sec = if total.as_secs_f64() > 0.0 {
            count as f64 / total.as_secs_f64()
        } else {
            0.0
        };

        let mut out = String::from("Profile data:\n");
        out.push_str(&format!(
            "  {} files in {:?} ({:.1} files/s)\n",
            count, total, per_sec
        ));

        let mut slowest: Vec<&Sample> = self.samples.iter().collect();
        slowest.sort_by(|a, b| b.elapsed.cmp(&a.elapsed));
        if !slowest.is_empty() {
            out.push_str("  slowest:\n");
            for sample in slowest.iter().take(SLOWEST_SHOWN) {
                out.push_str(&format!(
                    "    {:>12?}  {}\n",
                    sample.elapsed,
                    sample.path.display()
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_passes_the_result_through_and_records_a_sample() {
        let mut profiler = Profiler::new();

        let value = profiler.time(Path::new("a.txt"), || 7);
        assert_eq!(value, 7);
        assert_eq!(profiler.samples.len(), 1);
        assert_eq!(profiler.samples[0].path, PathBuf::from("a.txt"));
    }

    #[test]
    fn empty_report_has_no_slowest_section() {
        let profiler = Profiler::new();
        let report = profiler.report();

        assert!(report.starts_with("Profile data:\n"));
        assert!(report.contains("0 files"));
        assert!(!report.contains("slowest:"));
    }

    #[test]
    fn slowest_files_come_first() {
        let mut profiler = Profiler::new();
        profiler.samples.push(Sample {
            path: "quick.bin".into(),
            elapsed: Duration::from_micros(10),
        });
        profiler.samples.push(Sample {
            path: "heavy.bin".into(),
            elapsed: Duration::from_millis(5),
        });

        let report = profiler.report();
        assert!(report.contains("2 files"));
        let heavy_at = report.find("heavy.bin").unwrap();
        let quick_at = report.find("quick.bin").unwrap();
        assert!(heavy_at < quick_at);
    }

    #[test]
    fn begin_supplies_the_total_elapsed_span() {
        let mut profiler = Profiler::new();
        profiler.begin();
        profiler.time(Path::new("x"), || ());

        // Total covers the run, not just the sampled closure.
        assert!(profiler.run_started.is_some());
        assert!(profiler.report().contains("1 files"));
    }
}
