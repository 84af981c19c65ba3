//! Reporting utilities: human-readable statistics, equations and summaries.
//!
//! Formatting code lives in one place so that the numeric code stays clean
//! and output changes are localized.

pub mod format;

pub use format::*;

use std::fmt;

use crate::domain::ClippedStatistics;

impl fmt::Display for ClippedStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forced = match self.forced_mean {
            Some(v) => format!("{v}"),
            None => "None".to_string(),
        };
        write!(
            f,
            "Stats(mean={:.4}; stdev={:.4}; num={}; total={}; median={:.4}; clip={:.4}; forcedMean={forced})",
            self.mean, self.stdev, self.num_used, self.total, self.median, self.clip_threshold
        )?;
        if let Some(sys_err) = self.sys_err {
            write!(f, " sysErr={sys_err:.4}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::ScalarSample;
    use crate::stats::compute_robust_statistics;

    #[test]
    fn stats_display_format() {
        let stats = compute_robust_statistics(&ScalarSample::from_values(vec![1.0, 2.0, 3.0]), 4.0, None);
        assert_eq!(
            stats.to_string(),
            "Stats(mean=2.0000; stdev=0.8165; num=3; total=3; median=2.0000; clip=2.9600; forcedMean=None)"
        );
    }

    #[test]
    fn stats_display_with_forced_mean_and_sys_err() {
        let mut stats = compute_robust_statistics(&ScalarSample::from_values(vec![1.0, 3.0]), 4.0, Some(0.0));
        stats.sys_err = Some(0.25);
        let text = stats.to_string();
        assert!(text.contains("mean=0.0000"));
        assert!(text.ends_with("forcedMean=0) sysErr=0.2500"));
    }
}
