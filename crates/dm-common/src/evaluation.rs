//! Offline quality metrics for a match classifier.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvaluationError {
    #[error("{labels} labels but {scores} scores")]
    LengthMismatch { labels: usize, scores: usize },
    #[error("no samples to evaluate")]
    Empty,
}

/// Confusion counts and derived rates for `score >= threshold` predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryMetrics {
    pub threshold: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

impl BinaryMetrics {
    pub fn at_threshold(labels: &[bool], scores: &[f64], threshold: f64) -> Self {
        let (mut tp, mut fp, mut tn, mut fn_) = (0, 0, 0, 0);
        for (&label, &score) in labels.iter().zip(scores) {
            match (label, score >= threshold) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        Self {
            threshold,
            true_positives: tp,
            false_positives: fp,
            true_negatives: tn,
            false_negatives: fn_,
            precision,
            recall,
            f1: f1(precision, recall),
            accuracy: ratio(tp + tn, tp + fp + tn + fn_),
        }
    }

    /// `[[tn, fp], [fn, tp]]`, rows are the true class.
    pub fn confusion_matrix(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrPoint {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
}

impl PrPoint {
    pub fn f1(&self) -> f64 {
        f1(self.precision, self.recall)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub positives: usize,
    pub average_precision: f64,
    pub roc_auc: Option<f64>,
    pub default_threshold: BinaryMetrics,
    pub optimal_threshold: BinaryMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn check_inputs(labels: &[bool], scores: &[f64]) -> Result<(), EvaluationError> {
    if labels.len() != scores.len() {
        return Err(EvaluationError::LengthMismatch {
            labels: labels.len(),
            scores: scores.len(),
        });
    }
    if labels.is_empty() {
        return Err(EvaluationError::Empty);
    }
    Ok(())
}

/// One point per distinct score, thresholds descending. Stops once every positive is
/// recalled; lower thresholds could only add false positives.
pub fn precision_recall_curve(labels: &[bool], scores: &[f64]) -> Vec<PrPoint> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let positives = labels.iter().filter(|l| **l).count();
    let mut points = Vec::new();
    let (mut tp, mut fp) = (0usize, 0usize);

    for (rank, &i) in order.iter().enumerate() {
        if labels[i] {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_group = order
            .get(rank + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if !last_of_group {
            continue;
        }

        points.push(PrPoint {
            threshold: scores[i],
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, positives),
        });
        if positives > 0 && tp == positives {
            break;
        }
    }
    points
}

/// Area under the precision-recall curve as a step sum: Σ (Rₖ − Rₖ₋₁)·Pₖ.
/// 0.0 when there are no positives.
pub fn average_precision(labels: &[bool], scores: &[f64]) -> f64 {
    let mut previous_recall = 0.0;
    precision_recall_curve(labels, scores)
        .into_iter()
        .map(|p| {
            let area = (p.recall - previous_recall) * p.precision;
            previous_recall = p.recall;
            area
        })
        .sum()
}

/// Probability that a random positive outscores a random negative (ties count half).
/// `None` unless both classes are present.
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Option<f64> {
    let pos: Vec<f64> = labels.iter().zip(scores).filter(|(l, _)| **l).map(|(_, s)| *s).collect();
    let neg: Vec<f64> = labels.iter().zip(scores).filter(|(l, _)| !**l).map(|(_, s)| *s).collect();
    if pos.is_empty() || neg.is_empty() {
        return None;
    }

    let wins: f64 = pos
        .iter()
        .flat_map(|p| neg.iter().map(move |n| (p, n)))
        .map(|(p, n)| match p.partial_cmp(n) {
            Some(Ordering::Greater) => 1.0,
            Some(Ordering::Equal) => 0.5,
            _ => 0.0,
        })
        .sum();
    Some(wins / (pos.len() * neg.len()) as f64)
}

/// Curve point with the highest F1; among equal F1 the lowest threshold wins.
pub fn optimal_f1_threshold(labels: &[bool], scores: &[f64]) -> Option<PrPoint> {
    precision_recall_curve(labels, scores)
        .into_iter()
        .rev()
        .fold(None, |best: Option<PrPoint>, point| match best {
            Some(b) if b.f1() >= point.f1() => Some(b),
            _ => Some(point),
        })
}

pub fn evaluate(labels: &[bool], scores: &[f64]) -> Result<EvaluationReport, EvaluationError> {
    check_inputs(labels, scores)?;

    let optimal = optimal_f1_threshold(labels, scores)
        .map(|p| p.threshold)
        .unwrap_or(DEFAULT_THRESHOLD);

    Ok(EvaluationReport {
        samples: labels.len(),
        positives: labels.iter().filter(|l| **l).count(),
        average_precision: average_precision(labels, scores),
        roc_auc: roc_auc(labels, scores),
        default_threshold: BinaryMetrics::at_threshold(labels, scores, DEFAULT_THRESHOLD),
        optimal_threshold: BinaryMetrics::at_threshold(labels, scores, optimal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn average_precision_matches_hand_computation() {
        // scores desc: 0.8(+) 0.4(-) 0.35(+) 0.1(-)
        let labels = [false, false, true, true];
        let scores = [0.1, 0.4, 0.35, 0.8];
        // recall 0.5 at precision 1.0, recall 1.0 at precision 2/3
        assert!(close(average_precision(&labels, &scores), 0.5 + 0.5 * (2.0 / 3.0)));
    }

    #[test]
    fn perfect_ranking_has_unit_scores() {
        let labels = [true, true, false, false];
        let scores = [0.9, 0.8, 0.2, 0.1];
        assert!(close(average_precision(&labels, &scores), 1.0));
        assert_eq!(roc_auc(&labels, &scores), Some(1.0));
    }

    #[test]
    fn roc_auc_needs_both_classes() {
        assert_eq!(roc_auc(&[true, true], &[0.1, 0.2]), None);
        assert_eq!(roc_auc(&[true, false], &[0.5, 0.5]), Some(0.5));
    }

    #[test]
    fn metrics_at_threshold() {
        let labels = [true, false, true, false];
        let scores = [0.7, 0.6, 0.3, 0.1];
        let m = BinaryMetrics::at_threshold(&labels, &scores, 0.5);

        assert_eq!(m.confusion_matrix(), [[1, 1], [1, 1]]);
        assert!(close(m.precision, 0.5));
        assert!(close(m.recall, 0.5));
        assert!(close(m.f1, 0.5));
        assert!(close(m.accuracy, 0.5));
    }

    #[test]
    fn optimal_threshold_maximizes_f1() {
        let labels = [true, false, true, false];
        let scores = [0.7, 0.6, 0.3, 0.1];
        let best = optimal_f1_threshold(&labels, &scores).unwrap();

        // threshold 0.3 recalls both positives with precision 2/3 -> F1 0.8
        assert!(close(best.threshold, 0.3));
        assert!(close(best.f1(), 0.8));
    }

    #[test]
    fn curve_stops_at_full_recall() {
        let labels = [true, false, false];
        let scores = [0.9, 0.5, 0.1];
        let curve = precision_recall_curve(&labels, &scores);
        assert_eq!(curve.len(), 1);
        assert!(close(curve[0].threshold, 0.9));
    }

    #[test]
    fn tied_scores_form_one_point() {
        let labels = [true, false, true];
        let scores = [0.5, 0.5, 0.2];
        let curve = precision_recall_curve(&labels, &scores);
        assert!(close(curve[0].precision, 0.5));
        assert!(close(curve[0].recall, 0.5));
    }

    #[test]
    fn evaluate_reports_both_thresholds() {
        let labels = [true, false, true, false];
        let scores = [0.7, 0.6, 0.3, 0.1];
        let report = evaluate(&labels, &scores).unwrap();

        assert_eq!(report.samples, 4);
        assert_eq!(report.positives, 2);
        assert!(close(report.default_threshold.threshold, 0.5));
        assert!(close(report.optimal_threshold.threshold, 0.3));
        assert!(report.optimal_threshold.f1 >= report.default_threshold.f1);
    }

    #[test]
    fn evaluate_rejects_bad_input() {
        assert_eq!(evaluate(&[], &[]), Err(EvaluationError::Empty));
        assert_eq!(
            evaluate(&[true], &[0.1, 0.2]),
            Err(EvaluationError::LengthMismatch { labels: 1, scores: 2 })
        );
    }

    #[test]
    fn nan_scores_still_yield_a_curve() {
        let labels = [true, false, true];
        let scores = [0.9, f64::NAN, 0.4];
        let curve = precision_recall_curve(&labels, &scores);

        let last = curve.last().unwrap();
        assert!(close(last.threshold, 0.4));
        assert!(close(last.recall, 1.0));
    }
}
