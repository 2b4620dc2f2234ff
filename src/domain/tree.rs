//! Histogram-binned regression trees for gradient boosting.
//!
//! Features are bucketed once into at most `max_bins` bins per column;
//! each tree is grown depth-first on the per-sample gradients and
//! hessians of the loss, choosing splits by second-order gain.

use serde::{Deserialize, Serialize};

use super::features::FEATURE_COUNT;

/// Quantile bin boundaries per feature column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBinner {
    /// `thresholds[f][b]` is the upper bound (inclusive) of bin `b` of feature `f`.
    thresholds: Vec<Vec<f64>>,
}

impl FeatureBinner {
    /// Compute bin boundaries from the training rows.
    ///
    /// Columns with at most `max_bins` distinct values get one bin per
    /// value; wider columns are cut at evenly spaced distinct values.
    pub fn fit(rows: &[[f64; FEATURE_COUNT]], max_bins: usize) -> Self {
        let max_bins = max_bins.max(2);
        let thresholds = (0..FEATURE_COUNT)
            .map(|f| {
                let mut values: Vec<f64> = rows.iter().map(|r| r[f]).collect();
                values.sort_by(f64::total_cmp);
                values.dedup();
                Self::column_thresholds(&values, max_bins)
            })
            .collect();
        Self { thresholds }
    }

    fn column_thresholds(distinct: &[f64], max_bins: usize) -> Vec<f64> {
        if distinct.len() < 2 {
            return Vec::new();
        }
        let midpoint = |i: usize| (distinct[i - 1] + distinct[i]) / 2.0;
        if distinct.len() <= max_bins {
            return (1..distinct.len()).map(midpoint).collect();
        }
        let mut cuts: Vec<f64> = (1..max_bins)
            .map(|i| midpoint((i * distinct.len() / max_bins).max(1)))
            .collect();
        cuts.dedup();
        cuts
    }

    /// Number of bins of one feature.
    pub fn n_bins(&self, feature: usize) -> usize {
        self.thresholds[feature].len() + 1
    }

    /// Upper bound of `bin` for `feature`; values `<=` it fall left of a split there.
    pub fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.thresholds[feature][bin]
    }

    /// Bin index of a raw value.
    pub fn bin(&self, feature: usize, value: f64) -> u8 {
        let idx = self.thresholds[feature].partition_point(|t| *t < value);
        u8::try_from(idx).unwrap_or(u8::MAX)
    }

    /// Bin every row.
    pub fn bin_rows(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<[u8; FEATURE_COUNT]> {
        rows.iter()
            .map(|row| std::array::from_fn(|f| self.bin(f, row[f])))
            .collect()
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
    pub min_split_gain: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, Default)]
struct BinStats {
    grad: f64,
    hess: f64,
    count: usize,
}

struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

struct TreeBuilder<'a> {
    binned: &'a [[u8; FEATURE_COUNT]],
    binner: &'a FeatureBinner,
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a TreeParams,
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit a tree to the given gradients and hessians.
    ///
    /// Leaf values are the regularised Newton step `-G / (H + lambda)`.
    pub fn fit(
        binned: &[[u8; FEATURE_COUNT]],
        binner: &FeatureBinner,
        grad: &[f64],
        hess: &[f64],
        params: &TreeParams,
    ) -> Self {
        let mut builder = TreeBuilder {
            binned,
            binner,
            grad,
            hess,
            params,
            nodes: Vec::new(),
        };
        builder.grow((0..binned.len()).collect(), 0);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Raw leaf value for a feature row.
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path, in splits.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }
}

impl TreeBuilder<'_> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let (g, h) = samples
            .iter()
            .fold((0.0, 0.0), |(g, h), &i| (g + self.grad[i], h + self.hess[i]));

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: -g / (h + self.params.l2_regularization),
        });

        if depth >= self.params.max_depth || samples.len() < 2 * self.params.min_samples_leaf {
            return idx;
        }

        let Some(split) = self.best_split(&samples, g, h) else {
            return idx;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| usize::from(self.binned[i][split.feature]) <= split.bin);

        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: self.binner.threshold(split.feature, split.bin),
            left,
            right,
        };
        idx
    }

    fn best_split(&self, samples: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let lambda = self.params.l2_regularization;
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_score = g * g / (h + lambda);
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..FEATURE_COUNT {
            let n_bins = self.binner.n_bins(feature);
            if n_bins < 2 {
                continue;
            }
            let mut hist = vec![BinStats::default(); n_bins];
            for &i in samples {
                let slot = &mut hist[usize::from(self.binned[i][feature])];
                slot.grad += self.grad[i];
                slot.hess += self.hess[i];
                slot.count += 1;
            }

            let mut left = BinStats::default();
            for (bin, stats) in hist.iter().enumerate().take(n_bins - 1) {
                left.grad += stats.grad;
                left.hess += stats.hess;
                left.count += stats.count;
                let right_count = samples.len() - left.count;
                if left.count < min_leaf || right_count < min_leaf {
                    continue;
                }
                let (gr, hr) = (g - left.grad, h - left.hess);
                let gain = left.grad * left.grad / (left.hess + lambda) + gr * gr / (hr + lambda)
                    - parent_score;
                if gain > self.params.min_split_gain
                    && best.as_ref().is_none_or(|b| gain > b.gain)
                {
                    best = Some(SplitCandidate { feature, bin, gain });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_leaf: 1,
            l2_regularization: 0.0,
            min_split_gain: 1e-12,
        }
    }

    #[test]
    fn test_binner_one_bin_per_distinct_value() {
        let rows = vec![[1.0, 0.0, 0.0, -2.0], [2.0, 0.0, 0.0, 0.0], [3.0, 0.0, 0.0, 2.0]];
        let binner = FeatureBinner::fit(&rows, 64);
        assert_eq!(binner.n_bins(0), 3);
        assert_eq!(binner.n_bins(1), 1);
        assert_eq!(binner.bin(0, 1.0), 0);
        assert_eq!(binner.bin(0, 2.0), 1);
        assert_eq!(binner.bin(0, 3.0), 2);
        assert!((binner.threshold(3, 0) + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_binner_caps_bin_count() {
        let rows: Vec<_> = (0..1000_i32).map(|i| [f64::from(i) / 1000.0, 0.0, 0.0, 0.0]).collect();
        let binner = FeatureBinner::fit(&rows, 16);
        assert!(binner.n_bins(0) <= 16);
        assert!(binner.n_bins(0) > 8);
    }

    #[test]
    fn test_bins_consistent_with_thresholds() {
        let rows: Vec<_> = (0..50_i32).map(|i| [f64::from(i) * 0.37, 0.0, 0.0, 0.0]).collect();
        let binner = FeatureBinner::fit(&rows, 8);
        for row in &rows {
            let bin = usize::from(binner.bin(0, row[0]));
            if bin < binner.n_bins(0) - 1 {
                assert!(row[0] <= binner.threshold(0, bin));
            }
            if bin > 0 {
                assert!(row[0] > binner.threshold(0, bin - 1));
            }
        }
    }

    #[test]
    fn test_tree_separates_step_function() {
        // Squared-error gradients for targets -1 / +1 at zero prediction.
        let rows: Vec<_> = (0..20_i32).map(|i| [f64::from(i), 0.0, 0.0, 0.0]).collect();
        let grad: Vec<f64> = (0..20_i32).map(|i| if i < 10 { 1.0 } else { -1.0 }).collect();
        let hess = vec![1.0; 20];
        let binner = FeatureBinner::fit(&rows, 64);
        let binned = binner.bin_rows(&rows);
        let tree = RegressionTree::fit(&binned, &binner, &grad, &hess, &params(3));

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf_count(), 2);
        assert!((tree.predict(&[3.0, 0.0, 0.0, 0.0]) + 1.0).abs() < 1e-12);
        assert!((tree.predict(&[15.0, 0.0, 0.0, 0.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tree_respects_max_depth() {
        let rows: Vec<_> = (0..64_i32).map(|i| [f64::from(i), 0.0, 0.0, 0.0]).collect();
        let grad: Vec<f64> = (0..64_i32).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let hess = vec![1.0; 64];
        let binner = FeatureBinner::fit(&rows, 64);
        let binned = binner.bin_rows(&rows);
        let tree = RegressionTree::fit(&binned, &binner, &grad, &hess, &params(2));
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_constant_gradient_gives_single_leaf() {
        let rows: Vec<_> = (0..10_i32).map(|i| [f64::from(i), 0.0, 0.0, 0.0]).collect();
        let grad = vec![0.5; 10];
        let hess = vec![1.0; 10];
        let binner = FeatureBinner::fit(&rows, 64);
        let binned = binner.bin_rows(&rows);
        let tree = RegressionTree::fit(&binned, &binner, &grad, &hess, &params(4));
        assert_eq!(tree.leaf_count(), 1);
        assert!((tree.predict(&[100.0, 0.0, 0.0, 0.0]) + 0.5).abs() < 1e-12);
    }
}
