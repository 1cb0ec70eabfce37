//! Small feed-forward network with a single sigmoid output.
//!
//! Weights are stored row-major per layer (`weights[out * input_dim + in]`).
//! Inference is deterministic; dropout is only applied by the trainer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::AiError;
use crate::encoder::ScoringModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Sigmoid,
    Linear,
}

impl Activation {
    fn apply(self, z: f32) -> f32 {
        match self {
            Self::Relu => z.max(0.0),
            Self::Sigmoid => sigmoid(z),
            Self::Linear => z,
        }
    }

    /// Derivative expressed in terms of the activation output.
    fn derivative(self, out: f32) -> f32 {
        match self {
            Self::Relu => {
                if out > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Sigmoid => out * (1.0 - out),
            Self::Linear => 1.0,
        }
    }
}

fn sigmoid(z: f32) -> f32 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Fully connected layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dense {
    pub input_dim: usize,
    pub output_dim: usize,
    pub activation: Activation,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

impl Dense {
    /// Glorot-uniform weights, zero bias.
    pub fn new<R: Rng>(input_dim: usize, output_dim: usize, activation: Activation, rng: &mut R) -> Self {
        let limit = (6.0 / (input_dim + output_dim) as f32).sqrt();
        let weights = (0..input_dim * output_dim)
            .map(|_| rng.random_range(-limit..limit))
            .collect();
        Self {
            input_dim,
            output_dim,
            activation,
            weights,
            bias: vec![0.0; output_dim],
        }
    }

    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        (0..self.output_dim)
            .map(|o| {
                let row = &self.weights[o * self.input_dim..(o + 1) * self.input_dim];
                let z: f32 = row
                    .iter()
                    .zip(input)
                    .filter(|&(_, &x)| x != 0.0)
                    .map(|(w, x)| w * x)
                    .sum::<f32>()
                    + self.bias[o];
                self.activation.apply(z)
            })
            .collect()
    }

    pub fn param_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    /// Check that parameter buffers match the declared dimensions.
    pub fn validate(&self) -> Result<(), String> {
        if self.input_dim == 0 || self.output_dim == 0 {
            return Err(format!(
                "dense layer has zero dimension ({}x{})",
                self.input_dim, self.output_dim
            ));
        }
        let expected = self.input_dim * self.output_dim;
        if self.weights.len() != expected {
            return Err(format!(
                "dense {}x{} holds {} weights, expected {expected}",
                self.input_dim,
                self.output_dim,
                self.weights.len()
            ));
        }
        if self.bias.len() != self.output_dim {
            return Err(format!(
                "dense layer with {} outputs holds {} biases",
                self.output_dim,
                self.bias.len()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Dense(Dense),
    Dropout { rate: f32 },
}

/// Stack of layers evaluated in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sequential {
    pub layers: Vec<Layer>,
}

/// Per-layer gradient buffers; empty for dropout layers.
#[derive(Debug, Clone)]
pub(crate) struct Gradients {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<Vec<f32>>,
}

impl Gradients {
    pub(crate) fn zeros_like(net: &Sequential) -> Self {
        let (weights, bias) = net
            .layers
            .iter()
            .map(|l| match l {
                Layer::Dense(d) => (vec![0.0; d.weights.len()], vec![0.0; d.bias.len()]),
                Layer::Dropout { .. } => (Vec::new(), Vec::new()),
            })
            .unzip();
        Self { weights, bias }
    }

    pub(crate) fn reset(&mut self) {
        for g in self.weights.iter_mut().chain(self.bias.iter_mut()) {
            g.iter_mut().for_each(|v| *v = 0.0);
        }
    }
}

impl Sequential {
    /// `Dense(64, relu) → Dropout(0.3) → Dense(32, relu) → Dense(1, sigmoid)`.
    pub fn email_priority<R: Rng>(input_dim: usize, rng: &mut R) -> Self {
        Self {
            layers: vec![
                Layer::Dense(Dense::new(input_dim, 64, Activation::Relu, rng)),
                Layer::Dropout { rate: 0.3 },
                Layer::Dense(Dense::new(64, 32, Activation::Relu, rng)),
                Layer::Dense(Dense::new(32, 1, Activation::Sigmoid, rng)),
            ],
        }
    }

    pub fn input_dim(&self) -> usize {
        self.dense_layers().next().map(|d| d.input_dim).unwrap_or(0)
    }

    pub fn param_count(&self) -> usize {
        self.dense_layers().map(Dense::param_count).sum()
    }

    /// Structural check for networks read from disk: non-empty, every dense
    /// layer consistent, consecutive layers chained, one output unit.
    pub fn validate(&self) -> Result<(), String> {
        let mut width: Option<usize> = None;
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Dense(d) => {
                    d.validate().map_err(|reason| format!("layer {i}: {reason}"))?;
                    if let Some(prev) = width
                        && prev != d.input_dim
                    {
                        return Err(format!(
                            "layer {i}: input_dim {} does not match previous output_dim {prev}",
                            d.input_dim
                        ));
                    }
                    width = Some(d.output_dim);
                }
                Layer::Dropout { rate } => {
                    if !(0.0..1.0).contains(rate) {
                        return Err(format!("layer {i}: dropout rate {rate} outside [0, 1)"));
                    }
                }
            }
        }
        match width {
            None => Err("network has no dense layers".to_string()),
            Some(1) => Ok(()),
            Some(n) => Err(format!("final layer has {n} outputs, expected 1")),
        }
    }

    fn dense_layers(&self) -> impl Iterator<Item = &Dense> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Dense(d) => Some(d),
            Layer::Dropout { .. } => None,
        })
    }

    /// Inference forward pass (dropout disabled).
    pub fn predict(&self, input: &[f32]) -> Result<f32, AiError> {
        let expected = self.input_dim();
        if input.len() != expected {
            return Err(AiError::DimensionMismatch {
                expected,
                got: input.len(),
            });
        }
        let mut activation = input.to_vec();
        for layer in &self.layers {
            if let Layer::Dense(d) = layer {
                activation = d.forward(&activation);
            }
        }
        activation.first().copied().ok_or(AiError::EmptyOutput)
    }

    /// Training forward pass followed by backpropagation of binary
    /// cross-entropy against `target`. Gradients are accumulated into `grads`.
    ///
    /// Returns the predicted probability.
    pub(crate) fn accumulate_gradients<R: Rng>(
        &self,
        input: &[f32],
        target: f32,
        grads: &mut Gradients,
        rng: &mut R,
    ) -> f32 {
        // activations[i] is the input of layer i.
        let mut activations: Vec<Vec<f32>> = Vec::with_capacity(self.layers.len() + 1);
        let mut masks: Vec<Vec<f32>> = Vec::with_capacity(self.layers.len());
        activations.push(input.to_vec());

        for layer in &self.layers {
            let prev = activations.last().map(Vec::as_slice).unwrap_or(&[]);
            let (out, mask) = match layer {
                Layer::Dense(d) => (d.forward(prev), Vec::new()),
                Layer::Dropout { rate } => {
                    let keep = 1.0 - rate;
                    let mask: Vec<f32> = prev
                        .iter()
                        .map(|_| if rng.random::<f32>() < keep { 1.0 / keep } else { 0.0 })
                        .collect();
                    let out = prev.iter().zip(&mask).map(|(a, m)| a * m).collect();
                    (out, mask)
                }
            };
            masks.push(mask);
            activations.push(out);
        }

        let probability = activations
            .last()
            .and_then(|a| a.first())
            .copied()
            .unwrap_or(0.5);

        // Sigmoid + BCE: gradient w.r.t. the final pre-activation is p - y.
        let mut delta = vec![probability - target];
        let last = self.layers.len() - 1;

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let input = &activations[i];
            match layer {
                Layer::Dense(d) => {
                    let output = &activations[i + 1];
                    // Convert d(loss)/d(output) into d(loss)/d(pre-activation).
                    if i != last {
                        for (dv, &out) in delta.iter_mut().zip(output) {
                            *dv *= d.activation.derivative(out);
                        }
                    }

                    let gw = &mut grads.weights[i];
                    let gb = &mut grads.bias[i];
                    let mut next = vec![0.0f32; d.input_dim];
                    for (o, &dz) in delta.iter().enumerate() {
                        if dz == 0.0 {
                            continue;
                        }
                        gb[o] += dz;
                        let row = o * d.input_dim;
                        for (j, &x) in input.iter().enumerate() {
                            if x != 0.0 {
                                gw[row + j] += dz * x;
                            }
                        }
                        if i > 0 {
                            for (n, w) in next.iter_mut().zip(&d.weights[row..row + d.input_dim]) {
                                *n += w * dz;
                            }
                        }
                    }
                    delta = next;
                }
                Layer::Dropout { .. } => {
                    for (dv, m) in delta.iter_mut().zip(&masks[i]) {
                        *dv *= m;
                    }
                }
            }
        }

        probability
    }

    /// Mutable access to parameters, paired with the matching gradients.
    pub(crate) fn params_mut(&mut self) -> impl Iterator<Item = (usize, &mut Vec<f32>, &mut Vec<f32>)> {
        self.layers.iter_mut().enumerate().filter_map(|(i, l)| match l {
            Layer::Dense(d) => Some((i, &mut d.weights, &mut d.bias)),
            Layer::Dropout { .. } => None,
        })
    }
}

impl ScoringModel for Sequential {
    fn input_dim(&self) -> Option<usize> {
        Some(Sequential::input_dim(self))
    }

    fn score(&self, features: &[f32]) -> Result<f64, AiError> {
        self.predict(features).map(f64::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn email_priority_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let net = Sequential::email_priority(100, &mut rng);
        assert_eq!(net.input_dim(), 100);
        assert_eq!(net.param_count(), 100 * 64 + 64 + 64 * 32 + 32 + 32 + 1);
        assert_eq!(net.layers.len(), 4);
    }

    #[test]
    fn output_is_probability() {
        let mut rng = StdRng::seed_from_u64(2);
        let net = Sequential::email_priority(20, &mut rng);
        for k in 0..10 {
            let input: Vec<f32> = (0..20).map(|i| ((i * k) % 7) as f32 - 3.0).collect();
            let p = net.predict(&input).unwrap();
            assert!((0.0..=1.0).contains(&p), "p = {p}");
        }
    }

    #[test]
    fn predict_rejects_wrong_dimension() {
        let mut rng = StdRng::seed_from_u64(3);
        let net = Sequential::email_priority(8, &mut rng);
        assert!(matches!(
            net.predict(&[0.0; 5]),
            Err(AiError::DimensionMismatch { expected: 8, got: 5 })
        ));
    }

    #[test]
    fn predict_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(4);
        let net = Sequential::email_priority(6, &mut rng);
        let x = [0.1, 0.0, 0.7, 0.2, 0.0, 0.4];
        assert_eq!(
            net.predict(&x).unwrap().to_bits(),
            net.predict(&x).unwrap().to_bits()
        );
    }

    #[test]
    fn validate_accepts_built_network() {
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(Sequential::email_priority(10, &mut rng).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_short_weights() {
        let net = Sequential {
            layers: vec![Layer::Dense(Dense {
                input_dim: 2,
                output_dim: 1,
                activation: Activation::Sigmoid,
                weights: vec![0.5],
                bias: vec![0.0],
            })],
        };
        let reason = net.validate().unwrap_err();
        assert!(reason.contains("1 weights, expected 2"), "{reason}");
    }

    #[test]
    fn validate_rejects_bias_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut net = Sequential::email_priority(4, &mut rng);
        if let Layer::Dense(d) = &mut net.layers[2] {
            d.bias.pop();
        }
        assert!(net.validate().unwrap_err().starts_with("layer 2:"));
    }

    #[test]
    fn validate_rejects_unchained_layers() {
        let mut rng = StdRng::seed_from_u64(8);
        let net = Sequential {
            layers: vec![
                Layer::Dense(Dense::new(4, 3, Activation::Relu, &mut rng)),
                Layer::Dense(Dense::new(5, 1, Activation::Sigmoid, &mut rng)),
            ],
        };
        let reason = net.validate().unwrap_err();
        assert!(reason.contains("does not match previous output_dim 3"), "{reason}");
    }

    #[test]
    fn validate_rejects_empty_and_wide_output() {
        let empty = Sequential { layers: Vec::new() };
        assert!(empty.validate().is_err());

        let dropout_only = Sequential {
            layers: vec![Layer::Dropout { rate: 0.3 }],
        };
        assert!(dropout_only.validate().is_err());

        let mut rng = StdRng::seed_from_u64(9);
        let wide = Sequential {
            layers: vec![Layer::Dense(Dense::new(4, 2, Activation::Sigmoid, &mut rng))],
        };
        assert!(wide.validate().unwrap_err().contains("expected 1"));
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(100.0) <= 1.0);
        assert!(sigmoid(-100.0) >= 0.0);
        assert!(sigmoid(-100.0).is_finite());
    }

    #[test]
    fn output_gradient_matches_finite_difference() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut net = Sequential {
            layers: vec![
                Layer::Dense(Dense::new(3, 4, Activation::Relu, &mut rng)),
                Layer::Dense(Dense::new(4, 1, Activation::Sigmoid, &mut rng)),
            ],
        };
        let x = [0.5, -0.2, 0.8];
        let y = 1.0;

        let mut grads = Gradients::zeros_like(&net);
        net.accumulate_gradients(&x, y, &mut grads, &mut rng);

        let loss = |net: &Sequential| {
            let p = net.predict(&x).unwrap() as f64;
            -(y as f64 * p.ln() + (1.0 - y as f64) * (1.0 - p).ln())
        };

        let eps = 1e-3f32;
        if let Layer::Dense(d) = &mut net.layers[1] {
            d.bias[0] += eps;
        }
        let up = loss(&net);
        if let Layer::Dense(d) = &mut net.layers[1] {
            d.bias[0] -= 2.0 * eps;
        }
        let down = loss(&net);
        let numeric = (up - down) / (2.0 * eps as f64);
        assert!((numeric - grads.bias[1][0] as f64).abs() < 1e-2);
    }
}
