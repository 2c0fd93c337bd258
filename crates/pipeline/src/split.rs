//! Class balancing and stratified train / validation / test splitting.

use std::path::Path;

use ndarray::{concatenate, Array1, ArrayD, Axis};
use ndarray_npy::{read_npy, write_npy};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;

use crate::error::PipelineError;

/// Seed used by the training scripts for every random choice.
pub const DEFAULT_SEED: u64 = 42;

/// Percentage of each class held out of training (split evenly between
/// validation and test).
pub const HOLDOUT_PERCENT: usize = 30;

/// Features with one row (first axis) per label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledSet {
    pub features: ArrayD<f32>,
    pub labels: Array1<i64>,
}

impl LabelledSet {
    pub fn new(features: ArrayD<f32>, labels: Array1<i64>) -> Result<Self, PipelineError> {
        if features.ndim() == 0 || features.len_of(Axis(0)) != labels.len() {
            return Err(PipelineError::InvalidInput(format!(
                "{} labels for features of shape {:?}",
                labels.len(),
                features.shape()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Number of rows with label 1.
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

/// The three output splits.
#[derive(Debug, Clone)]
pub struct Splits {
    pub train: LabelledSet,
    pub val: LabelledSet,
    pub test: LabelledSet,
}

impl Splits {
    /// Write `X_{train,val,test}.npy` and `y_{train,val,test}.npy` into `dir`.
    pub fn save(&self, dir: &Path) -> Result<(), PipelineError> {
        std::fs::create_dir_all(dir)?;
        for (name, set) in [("train", &self.train), ("val", &self.val), ("test", &self.test)] {
            write_npy(dir.join(format!("X_{name}.npy")), &set.features)?;
            write_npy(dir.join(format!("y_{name}.npy")), &set.labels)?;
        }
        Ok(())
    }
}

/// Load a feature array and its labels from `.npy` files.
pub fn load_set(features: &Path, labels: &Path) -> Result<LabelledSet, PipelineError> {
    let features: ArrayD<f32> = read_npy(features)?;
    let labels: Array1<i64> = read_npy(labels)?;
    LabelledSet::new(features, labels)
}

/// Randomly downsample both classes to the size of the smaller one and stack
/// them, positives first, relabelled 1 and 0.
pub fn balance_classes(
    positive: &ArrayD<f32>,
    negative: &ArrayD<f32>,
    rng: &mut StdRng,
) -> Result<LabelledSet, PipelineError> {
    if positive.ndim() == 0 || negative.ndim() == 0 {
        return Err(PipelineError::InvalidInput(
            "class arrays need a sample axis".to_string(),
        ));
    }
    if positive.shape().get(1..) != negative.shape().get(1..) {
        return Err(PipelineError::InvalidInput(format!(
            "class shapes differ: {:?} vs {:?}",
            positive.shape(),
            negative.shape()
        )));
    }

    let n = positive.len_of(Axis(0)).min(negative.len_of(Axis(0)));
    let pos_idx = index::sample(rng, positive.len_of(Axis(0)), n).into_vec();
    let neg_idx = index::sample(rng, negative.len_of(Axis(0)), n).into_vec();

    let features = concatenate(
        Axis(0),
        &[
            positive.select(Axis(0), &pos_idx).view(),
            negative.select(Axis(0), &neg_idx).view(),
        ],
    )?;
    let labels = Array1::from_iter(
        std::iter::repeat(1)
            .take(n)
            .chain(std::iter::repeat(0).take(n)),
    );
    LabelledSet::new(features, labels)
}

/// Split 70 / 15 / 15 while keeping each class's share in every split.
///
/// Per class, `ceil(0.3 · n)` rows are held out; of those, `ceil(half)` go to
/// test and the rest to validation. Each split is shuffled.
pub fn stratified_split(set: &LabelledSet, rng: &mut StdRng) -> Splits {
    let mut classes: Vec<i64> = set.labels.iter().copied().collect();
    classes.sort_unstable();
    classes.dedup();

    let (mut train, mut val, mut test) = (Vec::new(), Vec::new(), Vec::new());
    for class in classes {
        let mut members: Vec<usize> = set
            .labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(rng);

        let holdout = (members.len() * HOLDOUT_PERCENT).div_ceil(100);
        let n_test = holdout.div_ceil(2);
        let n_train = members.len() - holdout;

        train.extend_from_slice(&members[..n_train]);
        val.extend_from_slice(&members[n_train..members.len() - n_test]);
        test.extend_from_slice(&members[members.len() - n_test..]);
    }

    train.shuffle(rng);
    val.shuffle(rng);
    test.shuffle(rng);

    Splits {
        train: set.select(&train),
        val: set.select(&val),
        test: set.select(&test),
    }
}

/// Balance two class arrays and split them with a fixed seed.
pub fn balance_and_split(
    positive: &ArrayD<f32>,
    negative: &ArrayD<f32>,
    seed: u64,
) -> Result<Splits, PipelineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let balanced = balance_classes(positive, negative, &mut rng)?;
    Ok(stratified_split(&balanced, &mut rng))
}
