use crate::optimize::error::Error;
use derive_more::Display;
use mediaopt_cache::Cache;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Why a file was left alone.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file extension isn't one of the supported image formats.
    #[display("unsupported-extension")]
    UnsupportedExtension,
    /// The file isn't strictly inside the media root.
    #[display("outside-media-root")]
    OutsideMediaRoot,
    /// The cache says the file is unchanged since it was last optimized.
    #[display("cached")]
    Cached,
}

/// What happened to a single file. Produced once per file, never mutated.
#[derive(Debug)]
pub enum Outcome {
    Optimized {
        /// Where the optimized asset now lives (the new path when renamed).
        path: PathBuf,
        original_bytes: u64,
        output_bytes: u64,
        /// The quality that produced the written bytes.
        quality: u8,
        /// Whether the extension (and so the public path) changed.
        renamed: bool,
        /// Public path of the optimized asset, also its cache key.
        public_path: String,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
    },
    DryRun {
        path: PathBuf,
        original_bytes: u64,
    },
    Failed {
        path: PathBuf,
        error: Error,
    },
}

impl Outcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Optimized { path, .. }
            | Self::Skipped { path, .. }
            | Self::DryRun { path, .. }
            | Self::Failed { path, .. } => path,
        }
    }

    /// Percentage of the original size saved, to one decimal place when
    /// displayed. Zero when either size is unknown (zero).
    pub fn saving_percent(original_bytes: u64, output_bytes: u64) -> f64 {
        if original_bytes == 0 || output_bytes == 0 {
            return 0.0;
        }
        (1.0 - output_bytes as f64 / original_bytes as f64) * 100.0
    }

    /// Emit the one-line log entry for this outcome.
    pub fn log(&self) {
        let name = self.path().file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let path = self.path().display();
        match self {
            Self::Optimized { original_bytes, output_bytes, quality, renamed, .. } => {
                let renamed = match renamed {
                    true => format!(
                        ", renamed to .{}",
                        self.path().extension().map(|e| e.to_string_lossy()).unwrap_or_default()
                    ),
                    false => String::new(),
                };
                info!(
                    %path,
                    "✔ {name} ({:.1} KB, q={quality}, saved {:.1}%{renamed})",
                    *output_bytes as f64 / 1024.0,
                    Self::saving_percent(*original_bytes, *output_bytes),
                );
            },
            Self::Skipped { reason, .. } => info!(%path, "↷ {name} [{reason}]"),
            Self::DryRun { original_bytes, .. } => info!(%path, original_bytes, "◷ {name} (dry run)"),
            Self::Failed { error, .. } => error!(%path, "✖ Failed to optimize {name}: {error:?}"),
        }
    }
}

/// Outcome counts for a run.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
#[display("{optimized} optimized · {skipped} skipped · {dry_run} dry run · {failed} errors")]
pub struct Summary {
    pub optimized: usize,
    pub skipped: usize,
    pub dry_run: usize,
    pub failed: usize,
}

impl<'a> FromIterator<&'a Outcome> for Summary {
    fn from_iter<I: IntoIterator<Item = &'a Outcome>>(outcomes: I) -> Self {
        outcomes.into_iter().fold(Self::default(), |mut summary, outcome| {
            match outcome {
                Outcome::Optimized { .. } => summary.optimized += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
                Outcome::DryRun { .. } => summary.dry_run += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
            summary
        })
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    /// The cache as it stood at the end of the run.
    pub cache: Cache,
    pub summary: Summary,
}

impl Report {
    pub fn new(outcomes: Vec<Outcome>, cache: Cache) -> Self {
        let summary = outcomes.iter().collect();
        Self { outcomes, cache, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::error::ErrorKind;
    use rstest::rstest;

    fn skipped(reason: SkipReason) -> Outcome {
        Outcome::Skipped { path: PathBuf::from("/site/public/media/a.png"), reason }
    }

    #[rstest]
    #[case(SkipReason::UnsupportedExtension, "unsupported-extension")]
    #[case(SkipReason::OutsideMediaRoot, "outside-media-root")]
    #[case(SkipReason::Cached, "cached")]
    fn test_skip_reason_display(#[case] reason: SkipReason, #[case] expected: &str) {
        assert_eq!(reason.to_string(), expected);
    }

    #[rstest]
    #[case(1000, 250, 75.0)]
    #[case(1000, 1000, 0.0)]
    #[case(1000, 1500, -50.0)]
    #[case(0, 250, 0.0)]
    #[case(1000, 0, 0.0)]
    fn test_saving_percent(#[case] original: u64, #[case] output: u64, #[case] expected: f64) {
        assert!((Outcome::saving_percent(original, output) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_summary() {
        let outcomes = vec![
            Outcome::Optimized {
                path: PathBuf::from("/site/public/media/a.webp"),
                original_bytes: 2000,
                output_bytes: 500,
                quality: 80,
                renamed: true,
                public_path: "/media/a.webp".to_string(),
            },
            skipped(SkipReason::Cached),
            skipped(SkipReason::UnsupportedExtension),
            Outcome::DryRun { path: PathBuf::from("/site/public/media/b.png"), original_bytes: 10 },
            Outcome::Failed {
                path: PathBuf::from("/site/public/media/c.png"),
                error: exn::Exn::from(ErrorKind::Encode),
            },
        ];
        let report = Report::new(outcomes, Cache::default());
        assert_eq!(report.summary, Summary { optimized: 1, skipped: 2, dry_run: 1, failed: 1 });
        assert_eq!(report.summary.to_string(), "1 optimized · 2 skipped · 1 dry run · 1 errors");
        assert_eq!(report.outcomes[4].path(), Path::new("/site/public/media/c.png"));
    }

    #[test]
    fn test_empty_summary() {
        let report = Report::new(vec![], Cache::default());
        assert_eq!(report.summary, Summary::default());
        assert!(report.outcomes.is_empty());
    }
}
