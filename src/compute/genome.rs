//! Genome representation and random operations for evolving agents.
//!
//! Provides random generation and Gaussian mutation. Decoding into network
//! weights lives in [`super::policy`].

use rand::prelude::*;

/// Inputs to the decision network: one density per direction.
pub const INPUT_SIZE: usize = 4;
/// Hidden units in the decision network.
pub const HIDDEN_SIZE: usize = 2;
/// Outputs of the decision network: one score per action.
pub const OUTPUT_SIZE: usize = 5;
/// Number of genes in a well-formed genome (18).
pub const GENOME_LEN: usize = INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE * OUTPUT_SIZE;

/// Fixed-length real vector encoding an agent's decision weights.
///
/// The length is not enforced at construction so that malformed genomes
/// surface as a [`ShapeError`] when decoded instead of being padded.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    genes: Vec<f32>,
}

impl Genome {
    /// Wrap raw genes.
    pub fn from_genes(genes: Vec<f32>) -> Self {
        Self { genes }
    }

    /// A genome of `GENOME_LEN` zeros.
    pub fn zeros() -> Self {
        Self {
            genes: vec![0.0; GENOME_LEN],
        }
    }

    #[inline]
    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Genome length did not match the network shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Genome has {actual} genes, expected {expected}")]
pub struct ShapeError {
    pub expected: usize,
    pub actual: usize,
}

/// Random number generator wrapper for genome operations and placement.
///
/// All randomness in a simulation flows through one instance so that a
/// seeded run replays exactly.
#[derive(Clone)]
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a random genome, each gene uniform in [-1, 1].
    pub fn random_genome(&mut self) -> Genome {
        let genes = (0..GENOME_LEN)
            .map(|_| self.rng.gen_range(-1.0f32..=1.0))
            .collect();
        Genome { genes }
    }

    /// Mutated copy of `genome`.
    ///
    /// Each gene independently, with probability `rate`, gets zero-mean
    /// Gaussian noise with standard deviation `sigma` added. A rate of zero
    /// returns an identical copy without touching the RNG.
    pub fn mutate(&mut self, genome: &Genome, rate: f32, sigma: f32) -> Genome {
        if rate <= 0.0 {
            return genome.clone();
        }

        let genes = genome
            .genes
            .iter()
            .map(|&gene| {
                if self.rng.r#gen::<f32>() < rate {
                    let noise: f32 = self.rng.sample(rand_distr::StandardNormal);
                    gene + noise * sigma
                } else {
                    gene
                }
            })
            .collect();

        Genome { genes }
    }

    /// Random in-bounds cell for a `width` x `height` grid.
    pub fn random_position(&mut self, width: usize, height: usize) -> (usize, usize) {
        (self.rng.gen_range(0..width), self.rng.gen_range(0..height))
    }
}

/// Mean absolute gene difference between two genomes of equal length.
pub fn genome_distance(g1: &Genome, g2: &Genome) -> f32 {
    let count = g1.len().min(g2.len());
    if count == 0 {
        return 0.0;
    }

    let total: f32 = g1
        .genes
        .iter()
        .zip(g2.genes.iter())
        .map(|(a, b)| (a - b).abs())
        .sum();

    total / count as f32
}
