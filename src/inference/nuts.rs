//! The No-U-Turn sampler with multinomial trajectory sampling
use rand::Rng;
use rand_distr::StandardNormal;

use crate::consts::DIVERGENCE_THRESHOLD;
use crate::misc::log_add_exp;
use crate::model::LogDensity;

/// A point in phase space
#[derive(Clone, Debug)]
pub(crate) struct State {
    pub q: Vec<f64>,
    pub p: Vec<f64>,
    pub lp: f64,
    pub grad: Vec<f64>,
}

impl State {
    pub(crate) fn new(density: &LogDensity<'_>, q: Vec<f64>) -> Self {
        let (lp, grad) = density.logp_and_grad(&q);
        State {
            p: vec![0.0; q.len()],
            q,
            lp,
            grad,
        }
    }

    fn kinetic(&self, inv_mass: &[f64]) -> f64 {
        0.5 * self
            .p
            .iter()
            .zip(inv_mass)
            .map(|(p, m)| p * p * m)
            .sum::<f64>()
    }

    pub(crate) fn hamiltonian(&self, inv_mass: &[f64]) -> f64 {
        self.kinetic(inv_mass) - self.lp
    }
}

/// Leapfrog integration of the Hamiltonian dynamics
pub(crate) struct Leapfrog<'a, 'm> {
    pub density: &'a LogDensity<'m>,
    pub step_size: f64,
    pub inv_mass: &'a [f64],
}

impl Leapfrog<'_, '_> {
    /// One step forward (`direction = 1.0`) or backward (`-1.0`)
    pub(crate) fn step(&self, state: &State, direction: f64) -> State {
        let eps = direction * self.step_size;
        let mut p: Vec<f64> = state
            .p
            .iter()
            .zip(&state.grad)
            .map(|(p, g)| (0.5 * eps).mul_add(*g, *p))
            .collect();
        let q: Vec<f64> = state
            .q
            .iter()
            .zip(&p)
            .zip(self.inv_mass)
            .map(|((q, p), m)| (eps * m).mul_add(*p, *q))
            .collect();
        let (lp, grad) = self.density.logp_and_grad(&q);
        for (pi, g) in p.iter_mut().zip(&grad) {
            *pi = (0.5 * eps).mul_add(*g, *pi);
        }
        State { q, p, lp, grad }
    }
}

/// Outcome of one NUTS transition
#[derive(Clone, Debug)]
pub(crate) struct Transition {
    pub state: State,
    pub depth: usize,
    pub n_steps: usize,
    pub divergent: bool,
    pub accept: f64,
    pub energy: f64,
}

/// A subtrajectory: its two ends, the proposal drawn from it, and the
/// bookkeeping needed to merge it into the full trajectory
struct Tree {
    left: State,
    right: State,
    proposal: State,
    log_weight: f64,
    n_steps: usize,
    sum_accept: f64,
    divergent: bool,
    turning: bool,
}

/// The no-U-turn criterion over the span `left..right`
fn is_turning(left: &State, right: &State, inv_mass: &[f64]) -> bool {
    let (mut dot_left, mut dot_right) = (0.0, 0.0);
    for i in 0..left.q.len() {
        let dq = right.q[i] - left.q[i];
        dot_left += dq * left.p[i] * inv_mass[i];
        dot_right += dq * right.p[i] * inv_mass[i];
    }
    dot_left < 0.0 || dot_right < 0.0
}

fn leaf(integrator: &Leapfrog<'_, '_>, from: &State, direction: f64, h0: f64) -> Tree {
    let state = integrator.step(from, direction);
    let h = state.hamiltonian(integrator.inv_mass);
    let h = if h.is_nan() { f64::INFINITY } else { h };
    let energy_error = h - h0;
    Tree {
        left: state.clone(),
        right: state.clone(),
        proposal: state,
        log_weight: -energy_error,
        n_steps: 1,
        sum_accept: (-energy_error).exp().min(1.0),
        divergent: energy_error > DIVERGENCE_THRESHOLD,
        turning: false,
    }
}

/// Build a balanced tree of `2^depth` leapfrog steps outward from `from`
fn build_tree<R: Rng>(
    integrator: &Leapfrog<'_, '_>,
    from: &State,
    depth: usize,
    direction: f64,
    h0: f64,
    rng: &mut R,
) -> Tree {
    if depth == 0 {
        return leaf(integrator, from, direction, h0);
    }

    let mut inner = build_tree(integrator, from, depth - 1, direction, h0, rng);
    if inner.divergent || inner.turning {
        return inner;
    }
    let edge = if direction > 0.0 { &inner.right } else { &inner.left };
    let outer = build_tree(integrator, edge, depth - 1, direction, h0, rng);

    let log_weight = log_add_exp(inner.log_weight, outer.log_weight);
    if rng.gen::<f64>() < (outer.log_weight - log_weight).exp() {
        inner.proposal = outer.proposal;
    }
    inner.log_weight = log_weight;
    inner.n_steps += outer.n_steps;
    inner.sum_accept += outer.sum_accept;
    inner.divergent |= outer.divergent;
    inner.turning |= outer.turning;
    if direction > 0.0 {
        inner.right = outer.right;
    } else {
        inner.left = outer.left;
    }
    inner.turning |= is_turning(&inner.left, &inner.right, integrator.inv_mass);
    inner
}

/// One NUTS transition starting from `current`
pub(crate) fn transition<R: Rng>(
    integrator: &Leapfrog<'_, '_>,
    current: &State,
    max_depth: usize,
    rng: &mut R,
) -> Transition {
    let mut start = current.clone();
    for (p, m) in start.p.iter_mut().zip(integrator.inv_mass) {
        let z: f64 = rng.sample(StandardNormal);
        *p = z / m.sqrt();
    }
    let h0 = start.hamiltonian(integrator.inv_mass);

    let mut tree = Tree {
        left: start.clone(),
        right: start.clone(),
        proposal: start,
        log_weight: 0.0,
        n_steps: 0,
        sum_accept: 0.0,
        divergent: false,
        turning: false,
    };

    let mut depth = 0;
    while depth < max_depth {
        let direction = if rng.gen::<bool>() { 1.0 } else { -1.0 };
        let edge = if direction > 0.0 { &tree.right } else { &tree.left };
        let subtree = build_tree(integrator, edge, depth, direction, h0, rng);
        depth += 1;

        tree.n_steps += subtree.n_steps;
        tree.sum_accept += subtree.sum_accept;
        if subtree.divergent || subtree.turning {
            tree.divergent |= subtree.divergent;
            break;
        }

        // biased progressive sampling favours the new subtree
        if rng.gen::<f64>() < (subtree.log_weight - tree.log_weight).exp() {
            tree.proposal = subtree.proposal;
        }
        tree.log_weight = log_add_exp(tree.log_weight, subtree.log_weight);
        if direction > 0.0 {
            tree.right = subtree.right;
        } else {
            tree.left = subtree.left;
        }
        if is_turning(&tree.left, &tree.right, integrator.inv_mass) {
            break;
        }
    }

    Transition {
        state: tree.proposal,
        depth,
        n_steps: tree.n_steps,
        divergent: tree.divergent,
        accept: tree.sum_accept / tree.n_steps.max(1) as f64,
        energy: h0,
    }
}
