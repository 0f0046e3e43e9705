//! Adam stochastic gradient descent
use serde::{Deserialize, Serialize};

/// Adam with bias-corrected moment estimates (Kingma & Ba 2014)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: usize,
}

impl Adam {
    /// Adam over `dim` parameters with the usual `beta1 = 0.9`,
    /// `beta2 = 0.999`, and `epsilon = 1e-8`
    pub fn new(dim: usize, learning_rate: f64) -> Self {
        Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1E-8,
            m: vec![0.0; dim],
            v: vec![0.0; dim],
            t: 0,
        }
    }

    pub fn with_betas(self, beta1: f64, beta2: f64) -> Self {
        Self {
            beta1,
            beta2,
            ..self
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Number of steps taken so far
    pub fn n_steps(&self) -> usize {
        self.t
    }

    /// Move `params` against `grad`
    pub fn step(&mut self, params: &mut [f64], grad: &[f64]) {
        debug_assert_eq!(params.len(), self.m.len());
        self.t += 1;
        let t = self.t as i32;
        let bias1 = 1.0 - self.beta1.powi(t);
        let bias2 = 1.0 - self.beta2.powi(t);

        for (((x, g), m), v) in params
            .iter_mut()
            .zip(grad)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            *m = self.beta1.mul_add(*m, (1.0 - self.beta1) * g);
            *v = self.beta2.mul_add(*v, (1.0 - self.beta2) * g * g);
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *x -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_the_learning_rate() {
        // bias correction makes the first step exactly lr * sign(g)
        let mut adam = Adam::new(2, 0.1);
        let mut x = vec![1.0, -1.0];
        adam.step(&mut x, &[3.0, -0.5]);
        assert::close(x[0], 0.9, 1E-6);
        assert::close(x[1], -0.9, 1E-6);
        assert_eq!(adam.n_steps(), 1);
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut adam = Adam::new(2, 0.05);
        let mut x = vec![3.0, -4.0];
        for _ in 0..3000 {
            let grad = vec![2.0 * (x[0] - 1.0), 8.0 * (x[1] + 2.0)];
            adam.step(&mut x, &grad);
        }
        assert::close(x[0], 1.0, 1E-3);
        assert::close(x[1], -2.0, 1E-3);
    }
}
