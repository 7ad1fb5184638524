//! Order-preserving sample splits for time-ordered data.
//!
//! Nothing in here shuffles: the test subset of a train/test split is always
//! strictly later than the training subset, and k-fold validation groups are
//! contiguous runs of samples.

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::ops::Range;

/// One regression sample: a trading day's position in the fetched window and its close
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// 0-based position of the trading day within the window
    pub index: usize,
    /// Closing price on that day
    pub close: f64,
}

/// Number the bars of a series by chronological position
pub fn samples_from_series(series: &PriceSeries) -> Vec<Sample> {
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(index, bar)| Sample {
            index,
            close: bar.close,
        })
        .collect()
}

/// Training samples followed by the held-out test samples
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

impl TrainTestSplit {
    pub fn train_features(&self) -> Vec<f64> {
        self.train.iter().map(|s| s.index as f64).collect()
    }

    pub fn train_targets(&self) -> Vec<f64> {
        self.train.iter().map(|s| s.close).collect()
    }

    pub fn test_features(&self) -> Vec<f64> {
        self.test.iter().map(|s| s.index as f64).collect()
    }

    pub fn test_targets(&self) -> Vec<f64> {
        self.test.iter().map(|s| s.close).collect()
    }

    pub fn last_test_index(&self) -> Option<usize> {
        self.test.last().map(|s| s.index)
    }
}

/// Split `samples` into a leading training part and a trailing test part.
///
/// The test part holds `ceil(test_fraction * n)` samples.
pub fn train_test_split(samples: &[Sample], test_fraction: f64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Test fraction must be between 0 and 1, got {test_fraction}"
        )));
    }

    let n = samples.len();
    let test_size = (n as f64 * test_fraction).ceil() as usize;
    let train_size = n.saturating_sub(test_size);
    if test_size == 0 || train_size == 0 {
        return Err(ForecastError::DataError(format!(
            "Cannot split {n} samples with test fraction {test_fraction}: both subsets must be non-empty"
        )));
    }

    Ok(TrainTestSplit {
        train: samples[..train_size].to_vec(),
        test: samples[train_size..].to_vec(),
    })
}

/// One cross-validation round: fit on everything outside `validation`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub validation: Range<usize>,
}

impl Fold {
    /// Indices used for fitting in this round
    pub fn train_indices(&self, n: usize) -> impl Iterator<Item = usize> + '_ {
        (0..n).filter(move |i| !self.validation.contains(i))
    }
}

/// Contiguous k-fold partition of `n` samples.
///
/// The first `n % k` folds receive one extra sample.
pub fn kfold(n: usize, k: usize) -> Result<Vec<Fold>> {
    if k < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "Cross-validation needs at least 2 folds, got {k}"
        )));
    }
    if k > n {
        return Err(ForecastError::DataError(format!(
            "Cannot make {k} folds from {n} training samples"
        )));
    }

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for i in 0..k {
        let size = base + usize::from(i < extra);
        folds.push(Fold {
            validation: start..start + size,
        });
        start += size;
    }

    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn samples(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample {
                index: i,
                close: 100.0 + i as f64,
            })
            .collect()
    }

    #[test]
    fn sixty_samples_hold_out_six() {
        let split = train_test_split(&samples(60), 0.1).unwrap();
        assert_eq!(split.train.len(), 54);
        assert_eq!(split.test.len(), 6);
        assert_eq!(split.test[0].index, 54);
        assert_eq!(split.last_test_index(), Some(59));
    }

    #[test]
    fn small_inputs_round_test_size_up() {
        let split = train_test_split(&samples(11), 0.1).unwrap();
        assert_eq!(split.test.len(), 2);
        assert!(train_test_split(&samples(1), 0.1).is_err());
        assert!(train_test_split(&samples(0), 0.1).is_err());
        assert!(train_test_split(&samples(10), 1.0).is_err());
    }

    #[rstest]
    #[case(0.1)]
    #[case(0.2)]
    #[case(0.5)]
    fn split_keeps_test_after_train(#[case] test_fraction: f64) {
        for n in 10..=200 {
            let split = train_test_split(&samples(n), test_fraction).unwrap();
            let last_train = split.train.last().unwrap().index;
            assert!(last_train < split.test[0].index, "n = {n}");
            assert_eq!(split.train.len() + split.test.len(), n);
        }
    }

    #[test]
    fn kfold_is_contiguous_and_covers_everything() {
        let folds = kfold(54, 5).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.validation.len()).collect();
        assert_eq!(sizes, vec![11, 11, 11, 11, 10]);

        let mut next = 0;
        for fold in &folds {
            assert_eq!(fold.validation.start, next);
            next = fold.validation.end;
        }
        assert_eq!(next, 54);

        let train: Vec<usize> = folds[1].train_indices(54).collect();
        assert_eq!(train.len(), 43);
        assert!(!train.contains(&11));
        assert!(train.contains(&22));
    }

    #[test]
    fn kfold_validates_arguments() {
        assert!(kfold(10, 1).is_err());
        assert!(kfold(4, 5).is_err());
        assert_eq!(kfold(5, 5).unwrap().len(), 5);
    }
}
