//! Per-object class labels used to split statistics.

use serde::{Deserialize, Serialize};

use crate::data::catalog::ColumnSource;
use crate::domain::SourceLabel;
use crate::error::DiagError;

/// Default extendedness column for star/galaxy separation.
pub const EXTENDEDNESS_COLUMN: &str = "base_ClassificationExtendedness_value";
/// Default column holding the number of bands classifying an object as a star.
pub const NUM_STAR_FLAGS_COLUMN: &str = "numStarFlags";

/// Extendedness below this is a point source.
const STAR_EXTENDEDNESS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Labeller {
    /// Everything is `All`.
    All,
    /// `Star` when extendedness < 0.5, else `Galaxy` (NaN counts as galaxy).
    StarGalaxy { column: String },
    /// `Star` when at least `num_bands` bands call it a star, `NotStar` when
    /// none do, `Maybe` otherwise.
    NumStar { column: String, num_bands: usize },
}

impl Labeller {
    pub fn star_galaxy() -> Self {
        Labeller::StarGalaxy {
            column: EXTENDEDNESS_COLUMN.to_string(),
        }
    }

    pub fn num_star(num_bands: usize) -> Self {
        Labeller::NumStar {
            column: NUM_STAR_FLAGS_COLUMN.to_string(),
            num_bands,
        }
    }

    /// Every label this labeller can produce.
    pub fn labels(&self) -> &'static [SourceLabel] {
        match self {
            Labeller::All => &[SourceLabel::All],
            Labeller::StarGalaxy { .. } => &[SourceLabel::Star, SourceLabel::Galaxy],
            Labeller::NumStar { .. } => &[SourceLabel::Star, SourceLabel::Maybe, SourceLabel::NotStar],
        }
    }

    /// Labels that are worth plotting and reporting.
    pub fn plot_labels(&self) -> &'static [SourceLabel] {
        match self {
            Labeller::All => &[SourceLabel::All],
            Labeller::StarGalaxy { .. } => &[SourceLabel::Star],
            Labeller::NumStar { .. } => &[SourceLabel::Star, SourceLabel::Maybe],
        }
    }

    pub fn label<S: ColumnSource + ?Sized>(&self, source: &S) -> Result<Vec<SourceLabel>, DiagError> {
        match self {
            Labeller::All => Ok(vec![SourceLabel::All; source.len()]),
            Labeller::StarGalaxy { column } => Ok(source
                .require_column(column)?
                .iter()
                .map(|&e| {
                    if e < STAR_EXTENDEDNESS {
                        SourceLabel::Star
                    } else {
                        SourceLabel::Galaxy
                    }
                })
                .collect()),
            Labeller::NumStar { column, num_bands } => Ok(source
                .require_column(column)?
                .iter()
                .map(|&n| {
                    if n >= *num_bands as f64 {
                        SourceLabel::Star
                    } else if n == 0.0 {
                        SourceLabel::NotStar
                    } else {
                        SourceLabel::Maybe
                    }
                })
                .collect()),
        }
    }
}

/// Number of per-band catalogs that classify each object as a star.
pub fn count_star_flags(per_band: &[&dyn ColumnSource], column: &str) -> Result<Vec<f64>, DiagError> {
    let len = per_band.first().map_or(0, |c| c.len());
    let mut counts = vec![0.0; len];
    for catalog in per_band {
        for (n, &e) in counts.iter_mut().zip(catalog.require_column(column)?) {
            if e < STAR_EXTENDEDNESS {
                *n += 1.0;
            }
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::Catalog;

    #[test]
    fn star_galaxy_split_on_extendedness() {
        let cat = Catalog::new(3)
            .with_column(EXTENDEDNESS_COLUMN, vec![0.0, 1.0, f64::NAN])
            .unwrap();
        let labels = Labeller::star_galaxy().label(&cat).unwrap();
        assert_eq!(labels, vec![SourceLabel::Star, SourceLabel::Galaxy, SourceLabel::Galaxy]);
    }

    #[test]
    fn num_star_counts_bands() {
        let g = Catalog::new(3).with_column(EXTENDEDNESS_COLUMN, vec![0.0, 0.0, 1.0]).unwrap();
        let r = Catalog::new(3).with_column(EXTENDEDNESS_COLUMN, vec![0.0, 1.0, 1.0]).unwrap();
        let counts = count_star_flags(&[&g, &r], EXTENDEDNESS_COLUMN).unwrap();
        assert_eq!(counts, vec![2.0, 1.0, 0.0]);

        let cat = Catalog::new(3).with_column(NUM_STAR_FLAGS_COLUMN, counts).unwrap();
        let labels = Labeller::num_star(2).label(&cat).unwrap();
        assert_eq!(labels, vec![SourceLabel::Star, SourceLabel::Maybe, SourceLabel::NotStar]);
    }

    #[test]
    fn missing_column_is_an_error() {
        assert!(Labeller::star_galaxy().label(&Catalog::new(1)).is_err());
        assert_eq!(Labeller::All.label(&Catalog::new(2)).unwrap().len(), 2);
    }
}
