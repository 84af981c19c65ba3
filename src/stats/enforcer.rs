//! Limit checks on computed statistics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{ClippedStatistics, SourceLabel};
use crate::error::{DiagError, ErrorKind};

/// A numeric field of `ClippedStatistics` that limits can be placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatField {
    Mean,
    Stdev,
    Median,
    Clip,
    Num,
    Total,
    SysErr,
}

impl StatField {
    pub fn value(self, stats: &ClippedStatistics) -> f64 {
        match self {
            StatField::Mean => stats.mean,
            StatField::Stdev => stats.stdev,
            StatField::Median => stats.median,
            StatField::Clip => stats.clip_threshold,
            StatField::Num => stats.num_used as f64,
            StatField::Total => stats.total as f64,
            StatField::SysErr => stats.sys_err.unwrap_or(f64::NAN),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatField::Mean => "mean",
            StatField::Stdev => "stdev",
            StatField::Median => "median",
            StatField::Clip => "clip",
            StatField::Num => "num",
            StatField::Total => "total",
            StatField::SysErr => "sysErr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Minimum,
    Maximum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitViolation {
    pub label: SourceLabel,
    pub field: StatField,
    pub kind: LimitKind,
    pub value: f64,
    pub limit: f64,
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let which = match self.kind {
            LimitKind::Minimum => "minimum",
            LimitKind::Maximum => "maximum",
        };
        write!(
            f,
            "{} {} = {:.6} exceeds {which} limit of {:.6}",
            self.label.display_name(),
            self.field.name(),
            self.value,
            self.limit
        )
    }
}

/// Require-greater / require-less limits per label and statistic.
///
/// A value fails a minimum when `value <= limit` and a maximum when
/// `value >= limit`. NaN never fails a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Enforcer {
    pub require_greater: BTreeMap<SourceLabel, BTreeMap<StatField, f64>>,
    pub require_less: BTreeMap<SourceLabel, BTreeMap<StatField, f64>>,
    /// Fail on the first violation instead of only logging it.
    pub raise: bool,
}

impl Enforcer {
    /// Check `stats` against the limits, logging each violation.
    ///
    /// Labels without statistics are skipped. In raise mode the first
    /// violation is returned as a `LimitViolation` error.
    pub fn check(
        &self,
        stats: &BTreeMap<SourceLabel, ClippedStatistics>,
        description: &str,
    ) -> Result<Vec<LimitViolation>, DiagError> {
        let mut violations = Vec::new();
        let passes = [
            (LimitKind::Minimum, &self.require_greater),
            (LimitKind::Maximum, &self.require_less),
        ];

        for (kind, limits) in passes {
            for (label, fields) in limits {
                let Some(label_stats) = stats.get(label) else {
                    log::warn!("{description}: no statistics for label '{}'", label.display_name());
                    continue;
                };
                for (&field, &limit) in fields {
                    let value = field.value(label_stats);
                    let failed = match kind {
                        LimitKind::Minimum => value <= limit,
                        LimitKind::Maximum => value >= limit,
                    };
                    if !failed {
                        continue;
                    }
                    let violation = LimitViolation {
                        label: *label,
                        field,
                        kind,
                        value,
                        limit,
                    };
                    let text = format!("{description} {violation}");
                    log::warn!("{text}");
                    if self.raise {
                        return Err(DiagError::new(ErrorKind::LimitViolation, text));
                    }
                    violations.push(violation);
                }
            }
        }

        Ok(violations)
    }
}
