//! Adam optimizer over the dense layers of a [`Sequential`] network.

use crate::network::{Gradients, Sequential};

#[derive(Debug, Clone, Copy)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

pub(crate) struct Adam {
    config: AdamConfig,
    step: i32,
    m: Gradients,
    v: Gradients,
}

impl Adam {
    pub(crate) fn new(net: &Sequential, config: AdamConfig) -> Self {
        Self {
            config,
            step: 0,
            m: Gradients::zeros_like(net),
            v: Gradients::zeros_like(net),
        }
    }

    /// Apply one update using gradients summed over `batch_len` samples.
    pub(crate) fn step(&mut self, net: &mut Sequential, grads: &Gradients, batch_len: usize) {
        self.step += 1;
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let lr_t = learning_rate * (1.0 - beta2.powi(self.step)).sqrt() / (1.0 - beta1.powi(self.step));
        let scale = 1.0 / batch_len.max(1) as f32;

        for (i, weights, bias) in net.params_mut() {
            let pairs = [
                (weights, &grads.weights[i], &mut self.m.weights[i], &mut self.v.weights[i]),
                (bias, &grads.bias[i], &mut self.m.bias[i], &mut self.v.bias[i]),
            ];
            for (params, g, m, v) in pairs {
                for k in 0..params.len() {
                    let gk = g[k] * scale;
                    m[k] = beta1 * m[k] + (1.0 - beta1) * gk;
                    v[k] = beta2 * v[k] + (1.0 - beta2) * gk * gk;
                    params[k] -= lr_t * m[k] / (v[k].sqrt() + epsilon);
                }
            }
        }
    }
}
