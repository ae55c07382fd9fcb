//! The `Forest`: a fixed-size ensemble of [`crate::core::RcTree`]s, the
//! orchestrator that plays the role the teacher's top-level `Cakes` search
//! struct plays for a single `Tree` — routing requests to members and
//! combining their answers, here by averaging rather than by merging
//! nearest-neighbor candidates.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::core::RcTree;
use crate::error::Error;
use crate::rng::{split_seed, RrcfRng};

#[derive(Debug, Clone, Copy)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub tree_size: usize,
    pub shingle_size: usize,
}

/// An ensemble of `RCTree`s, each an independent anomaly detector whose
/// scores are averaged.
#[derive(Debug)]
pub struct Forest {
    trees: Vec<RcTree>,
    config: ForestConfig,
    shingler: Option<RollingShingle>,
    data_points: usize,
    seed: u64,
}

/// A 1-element-at-a-time rolling buffer feeding `Shingler` one sample per
/// `update` call, distinct from the batch-oriented `Shingler` used by the
/// demo binary over a whole pre-generated series.
#[derive(Debug)]
struct RollingShingle {
    buffer: std::collections::VecDeque<f64>,
    size: usize,
}

impl RollingShingle {
    fn new(size: usize) -> Self {
        Self { buffer: std::collections::VecDeque::with_capacity(size), size }
    }

    /// Pushes a new scalar and returns the current window once it is full.
    fn push(&mut self, value: f64) -> Option<Vec<f64>> {
        self.buffer.push_back(value);
        if self.buffer.len() > self.size {
            self.buffer.pop_front();
        }
        if self.buffer.len() == self.size {
            Some(self.buffer.iter().copied().collect())
        } else {
            None
        }
    }
}

impl Forest {
    /// Builds `num_trees` empty trees, each independently seeded from
    /// system entropy unless [`Forest::with_seed`] is applied afterward.
    pub fn new(num_trees: usize, tree_size: usize, shingle_size: usize) -> Self {
        let seed = rand::random::<u64>();
        let mut forest = Self {
            trees: Vec::new(),
            config: ForestConfig { num_trees, tree_size, shingle_size },
            shingler: if shingle_size > 0 { Some(RollingShingle::new(shingle_size)) } else { None },
            data_points: 0,
            seed,
        };
        forest.reseed_empty_trees();
        forest
    }

    /// Reseeds every tree deterministically from `seed`, replacing the
    /// entropy-derived default from `new`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.reseed_empty_trees();
        self
    }

    fn reseed_empty_trees(&mut self) {
        let mut state = self.seed;
        self.trees = (0..self.config.num_trees)
            .map(|_| RcTree::new(split_seed(&mut state)))
            .collect();
    }

    pub fn num_trees(&self) -> usize {
        self.config.num_trees
    }

    /// Builds a fresh ensemble from `data`, replacing any trees built or
    /// streamed into so far.
    ///
    /// Samples in batches rather than drawing each tree's rows completely
    /// independently: each batch draws one without-replacement sample of
    /// `rows_per_batch * tree_size` indices and slices it into
    /// `rows_per_batch` disjoint chunks, one per tree, so trees built from
    /// the same batch never overlap. Fresh batches are drawn (and their
    /// disjoint chunks consumed) until `num_trees` trees exist, mirroring
    /// the reference driver's `BatchTrial` (`num.RndArray` shape
    /// `⌊n/tree_size⌋ × tree_size`, reused across batches until the forest
    /// is full).
    pub fn train(&mut self, data: &[Vec<f64>]) {
        let tree_size = self.config.tree_size.min(data.len());
        if tree_size == 0 {
            self.reseed_empty_trees();
            return;
        }
        let rows_per_batch = (data.len() / tree_size).max(1);

        let mut state = self.seed;
        let mut rng = RrcfRng::new(split_seed(&mut state));
        let mut trees = Vec::with_capacity(self.config.num_trees);
        while trees.len() < self.config.num_trees {
            let batch = rng.sample_without_replacement(data.len(), rows_per_batch * tree_size);
            for chunk in batch.chunks(tree_size) {
                if trees.len() == self.config.num_trees {
                    break;
                }
                let sample = chunk.to_vec();
                let sampled_data: Vec<Vec<f64>> = sample.iter().map(|&i| data[i].clone()).collect();
                let tree_seed = split_seed(&mut state);
                trees.push(RcTree::build(&sampled_data, Some(sample), 9, tree_seed));
            }
        }
        self.trees = trees;
    }

    /// Streams a single point into every tree, enforcing the FIFO size cap
    /// and returning the mean collusive displacement across the ensemble.
    pub fn update(&mut self, sample_index: usize, point: &[f64]) -> Result<f64, Error> {
        let working_point = if point.len() == 1 && self.config.shingle_size > 0 {
            let shingler = self.shingler.get_or_insert_with(|| RollingShingle::new(self.config.shingle_size));
            match shingler.push(point[0]) {
                Some(window) => window,
                None => {
                    self.data_points += 1;
                    return Ok(0.0);
                }
            }
        } else {
            point.to_vec()
        };

        let tree_size = self.config.tree_size;
        let results: Vec<Result<f64, Error>> = self
            .trees
            .par_iter_mut()
            .enumerate()
            .map(|(tree_index, tree)| {
                update_one_tree(tree, tree_size, sample_index, &working_point)
                    .map_err(|source| Error::Forest { tree_index, source: Box::new(source) })
            })
            .collect();

        let num_trees = results.len().max(1) as f64;
        let mut total = 0.0;
        for result in results {
            total += result?;
        }
        self.data_points += 1;
        Ok(total / num_trees)
    }

    /// The per-index anomaly score averaged over every tree that currently
    /// holds that index as a leaf.
    pub fn score_all(&self) -> HashMap<usize, f64> {
        let mut sums: HashMap<usize, f64> = HashMap::new();
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for tree in &self.trees {
            for index in tree.indices() {
                if let Ok(score) = tree.codisp(index) {
                    *sums.entry(index).or_insert(0.0) += score;
                    *counts.entry(index).or_insert(0) += 1;
                }
            }
        }
        sums.into_iter()
            .map(|(index, sum)| {
                let count = counts[&index] as f64;
                (index, sum / count)
            })
            .collect()
    }
}

fn update_one_tree(tree: &mut RcTree, tree_size: usize, sample_index: usize, point: &[f64]) -> Result<f64, Error> {
    if tree.len() > tree_size && sample_index >= tree_size {
        let oldest = sample_index - tree_size;
        if tree.contains(oldest) {
            tree.forget(oldest)?;
        }
    }
    tree.insert(point, sample_index, 0.0)?;
    tree.codisp(sample_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shingle::Shingler;

    fn sine_wave(n: usize, amplitude: f64, center: f64, period: f64, phase: f64) -> Vec<f64> {
        (0..n)
            .map(|i| center + amplitude * ((i as f64 * period) - phase * period).sin())
            .collect()
    }

    #[test]
    fn streaming_sine_wave_flags_injected_anomaly() {
        let mut series = sine_wave(300, 50.0, 100.0, 2.0 * std::f64::consts::PI / 100.0, 30.0);
        for value in series.iter_mut().take(120).skip(100) {
            *value = 240.0;
        }

        let mut forest = Forest::new(20, 64, 4).with_seed(11);
        let mut shingler = Shingler::new(series.clone(), 4);

        let mut scores = Vec::new();
        let mut index = 0;
        while let Some(window) = shingler.next_window() {
            let score = forest.update(index, &window).unwrap();
            scores.push(score);
            index += 1;
        }

        let baseline: f64 = scores[0..80].iter().sum::<f64>() / 80.0;
        let anomaly_peak = scores[100..120].iter().cloned().fold(0.0_f64, f64::max);
        assert!(
            anomaly_peak > baseline * 1.5,
            "expected the injected anomaly to stand out: baseline={baseline}, peak={anomaly_peak}"
        );
    }

    #[test]
    fn train_draws_disjoint_samples_within_a_batch() {
        let data: Vec<Vec<f64>> = (0..400).map(|i| vec![i as f64]).collect();
        // tree_size=50 over 400 rows gives rows_per_batch=8; requesting
        // exactly 8 trees means all of them come from a single batch draw,
        // so their sampled rows must be pairwise disjoint.
        let mut forest = Forest::new(8, 50, 0).with_seed(3);
        forest.train(&data);

        let sets: Vec<std::collections::HashSet<usize>> =
            forest.trees.iter().map(|tree| tree.indices().collect()).collect();
        for i in 0..sets.len() {
            for j in (i + 1)..sets.len() {
                assert!(
                    sets[i].is_disjoint(&sets[j]),
                    "trees {i} and {j} shared sampled rows within the same batch"
                );
            }
        }
    }

    #[test]
    fn batch_train_assigns_scores_to_most_rows() {
        let mut data = Vec::new();
        for i in 0..400 {
            let base = if (100..110).contains(&i) { 12.0 } else { 0.0 };
            data.push(vec![base + (i as f64 * 0.001), base, base - (i as f64 * 0.001)]);
        }

        let mut forest = Forest::new(30, 64, 0).with_seed(5);
        forest.train(&data);
        let scores = forest.score_all();
        assert!(!scores.is_empty());
        assert!(scores.len() <= data.len());
    }
}
