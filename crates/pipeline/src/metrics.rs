//! Binary classification metrics for model evaluation reports.

use serde::Serialize;

use crate::error::PipelineError;

/// Score at or above which a prediction counts as positive.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Counts of a binary confusion matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

/// Ratio with 0 for an empty denominator.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[i64], predictions: &[i64]) -> Result<Self, PipelineError> {
        if labels.len() != predictions.len() {
            return Err(PipelineError::InvalidInput(format!(
                "{} labels but {} predictions",
                labels.len(),
                predictions.len()
            )));
        }
        let mut m = Self::default();
        for (&y, &p) in labels.iter().zip(predictions) {
            match (y != 0, p != 0) {
                (false, false) => m.true_negatives += 1,
                (false, true) => m.false_positives += 1,
                (true, false) => m.false_negatives += 1,
                (true, true) => m.true_positives += 1,
            }
        }
        Ok(m)
    }

    pub fn from_scores(labels: &[i64], scores: &[f32], threshold: f64) -> Result<Self, PipelineError> {
        let predictions: Vec<i64> = scores
            .iter()
            .map(|&s| i64::from(f64::from(s) >= threshold))
            .collect();
        Self::from_predictions(labels, &predictions)
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Sensitivity.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.true_negatives, self.true_negatives + self.false_positives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// Area under the ROC curve via the rank-sum statistic, ties averaged.
///
/// `None` when only one class is present.
pub fn roc_auc(labels: &[i64], scores: &[f32]) -> Option<f64> {
    if labels.len() != scores.len() {
        return None;
    }
    let positives = labels.iter().filter(|&&l| l != 0).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based average rank of the tie group.
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(&l, _)| l != 0)
        .map(|(_, r)| r)
        .sum();
    let p = positives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}

/// Summary written by the evaluate job.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub threshold: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub f1: f64,
    pub roc_auc: Option<f64>,
}

/// Evaluate scores against ground-truth labels.
pub fn evaluate(labels: &[i64], scores: &[f32], threshold: f64) -> Result<EvaluationReport, PipelineError> {
    let m = ConfusionMatrix::from_scores(labels, scores, threshold)?;
    Ok(EvaluationReport {
        samples: m.total(),
        threshold,
        confusion_matrix: m,
        accuracy: m.accuracy(),
        precision: m.precision(),
        recall: m.recall(),
        specificity: m.specificity(),
        f1: m.f1(),
        roc_auc: roc_auc(labels, scores),
    })
}
