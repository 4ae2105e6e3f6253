//! Decision network decoded from a genome.
//!
//! Two-layer feed-forward network: `4 -> tanh(2) -> 5`, no biases and no
//! output nonlinearity. The highest output picks the action, ties going to
//! the lowest index.

use super::genome::{GENOME_LEN, Genome, HIDDEN_SIZE, INPUT_SIZE, OUTPUT_SIZE, ShapeError};

/// Movement actions, indexed by network output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Forward,
    Backward,
    Stay,
}

impl Action {
    /// All actions in output-index order.
    pub const ALL: [Action; OUTPUT_SIZE] = [
        Action::Left,
        Action::Right,
        Action::Forward,
        Action::Backward,
        Action::Stay,
    ];

    /// Action for a network output index.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Unit displacement `(dx, dy)` in world axes.
    ///
    /// Forward is +y and backward is -y regardless of how the agent last
    /// moved; agents carry no heading.
    #[inline]
    pub fn displacement(self) -> (isize, isize) {
        match self {
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::Forward => (0, 1),
            Action::Backward => (0, -1),
            Action::Stay => (0, 0),
        }
    }
}

/// Weight matrices of the decision network.
///
/// Derived from a genome and never edited directly; a different genome
/// means a different `PolicyWeights`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyWeights {
    /// Input to hidden, `HIDDEN_SIZE x INPUT_SIZE`, row-major.
    pub w_ih: [[f32; INPUT_SIZE]; HIDDEN_SIZE],
    /// Hidden to output, `OUTPUT_SIZE x HIDDEN_SIZE`, row-major.
    pub w_ho: [[f32; HIDDEN_SIZE]; OUTPUT_SIZE],
}

impl PolicyWeights {
    /// Reshape a genome into weight matrices.
    ///
    /// The first `INPUT_SIZE * HIDDEN_SIZE` genes fill `w_ih` row by row,
    /// the remainder fill `w_ho`. Fails if the genome length is wrong.
    pub fn decode(genome: &Genome) -> Result<Self, ShapeError> {
        let genes = genome.genes();
        if genes.len() != GENOME_LEN {
            return Err(ShapeError {
                expected: GENOME_LEN,
                actual: genes.len(),
            });
        }

        let (ih, ho) = genes.split_at(INPUT_SIZE * HIDDEN_SIZE);

        let mut w_ih = [[0.0f32; INPUT_SIZE]; HIDDEN_SIZE];
        for (row, chunk) in w_ih.iter_mut().zip(ih.chunks_exact(INPUT_SIZE)) {
            row.copy_from_slice(chunk);
        }

        let mut w_ho = [[0.0f32; HIDDEN_SIZE]; OUTPUT_SIZE];
        for (row, chunk) in w_ho.iter_mut().zip(ho.chunks_exact(HIDDEN_SIZE)) {
            row.copy_from_slice(chunk);
        }

        Ok(Self { w_ih, w_ho })
    }

    /// Flatten back into gene order.
    pub fn flatten(&self) -> Vec<f32> {
        self.w_ih
            .iter()
            .flatten()
            .chain(self.w_ho.iter().flatten())
            .copied()
            .collect()
    }

    /// Forward pass, returning the raw output scores.
    pub fn forward(&self, input: &[f32; INPUT_SIZE]) -> [f32; OUTPUT_SIZE] {
        let mut hidden = [0.0f32; HIDDEN_SIZE];
        for (h, row) in hidden.iter_mut().zip(self.w_ih.iter()) {
            let sum: f32 = row.iter().zip(input.iter()).map(|(w, x)| w * x).sum();
            *h = sum.tanh();
        }

        let mut output = [0.0f32; OUTPUT_SIZE];
        for (o, row) in output.iter_mut().zip(self.w_ho.iter()) {
            *o = row.iter().zip(hidden.iter()).map(|(w, h)| w * h).sum();
        }
        output
    }

    /// Pick an action for the sensed densities.
    pub fn decide(&self, input: &[f32; INPUT_SIZE]) -> Action {
        Action::ALL[argmax(&self.forward(input))]
    }
}

/// Index of the largest value; the first one wins ties.
///
/// NaN never beats a number, so a NaN-free prefix keeps its winner.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] || (values[best].is_nan() && !v.is_nan()) {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp_genome() -> Genome {
        Genome::from_genes((0..GENOME_LEN).map(|i| i as f32).collect())
    }

    #[test]
    fn test_decode_row_major() {
        let weights = PolicyWeights::decode(&ramp_genome()).unwrap();
        assert_eq!(weights.w_ih[0], [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(weights.w_ih[1], [4.0, 5.0, 6.0, 7.0]);
        assert_eq!(weights.w_ho[0], [8.0, 9.0]);
        assert_eq!(weights.w_ho[4], [16.0, 17.0]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let short = Genome::from_genes(vec![0.0; GENOME_LEN - 1]);
        assert_eq!(
            PolicyWeights::decode(&short),
            Err(ShapeError {
                expected: GENOME_LEN,
                actual: GENOME_LEN - 1
            })
        );

        let long = Genome::from_genes(vec![0.0; GENOME_LEN + 3]);
        assert!(PolicyWeights::decode(&long).is_err());
    }

    #[test]
    fn test_zero_weights_choose_left() {
        let weights = PolicyWeights::decode(&Genome::zeros()).unwrap();
        assert_eq!(weights.forward(&[1.0, 2.0, 0.5, 0.0]), [0.0; OUTPUT_SIZE]);
        assert_eq!(weights.decide(&[1.0, 2.0, 0.5, 0.0]), Action::Left);
    }

    #[test]
    fn test_forward_matches_hand_computation() {
        let mut genes = vec![0.0f32; GENOME_LEN];
        // hidden[0] = tanh(input[0]); hidden[1] = tanh(input[1])
        genes[0] = 1.0;
        genes[5] = 1.0;
        // output[2] = hidden[0], output[3] = hidden[1]
        genes[8 + 4] = 1.0;
        genes[8 + 7] = 1.0;
        let weights = PolicyWeights::decode(&Genome::from_genes(genes)).unwrap();

        let out = weights.forward(&[0.5, 0.0, 0.0, 0.0]);
        assert!((out[2] - 0.5f32.tanh()).abs() < 1e-6);
        assert_eq!(out[3], 0.0);
        assert_eq!(weights.decide(&[0.5, 0.0, 0.0, 0.0]), Action::Forward);
        assert_eq!(weights.decide(&[0.0, 0.5, 0.0, 0.0]), Action::Backward);
    }

    #[test]
    fn test_argmax_leftmost_tie() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 0.0]), 1);
        assert_eq!(argmax(&[0.0, 0.0, 0.0]), 0);
        assert_eq!(argmax(&[-1.0, -0.5, -2.0]), 1);
        assert_eq!(argmax(&[f32::NAN, 1.0, 2.0]), 2);
    }

    #[test]
    fn test_action_displacements() {
        assert_eq!(Action::from_index(0).map(Action::displacement), Some((-1, 0)));
        assert_eq!(Action::from_index(1).map(Action::displacement), Some((1, 0)));
        assert_eq!(Action::from_index(2).map(Action::displacement), Some((0, 1)));
        assert_eq!(Action::from_index(3).map(Action::displacement), Some((0, -1)));
        assert_eq!(Action::from_index(4).map(Action::displacement), Some((0, 0)));
        assert_eq!(Action::from_index(5), None);
    }

    proptest! {
        #[test]
        fn proptest_decode_is_lossless_and_deterministic(
            genes in proptest::collection::vec(-5.0f32..5.0f32, GENOME_LEN),
        ) {
            let genome = Genome::from_genes(genes.clone());
            let a = PolicyWeights::decode(&genome).unwrap();
            let b = PolicyWeights::decode(&genome).unwrap();
            prop_assert_eq!(a.flatten().len(), genome.len());
            prop_assert_eq!(a.flatten(), genes);
            prop_assert!(a.flatten().iter().zip(b.flatten()).all(|(x, y)| x.to_bits() == y.to_bits()));
        }

        #[test]
        fn proptest_decide_is_pure(
            genes in proptest::collection::vec(-5.0f32..5.0f32, GENOME_LEN),
            input in proptest::array::uniform4(0.0f32..10.0f32),
        ) {
            let weights = PolicyWeights::decode(&Genome::from_genes(genes)).unwrap();
            prop_assert_eq!(weights.decide(&input), weights.decide(&input));
        }
    }
}
