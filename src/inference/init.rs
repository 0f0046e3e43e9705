use rand::Rng;

use super::SamplingError;
use crate::consts::MAX_INIT_TRIES;
use crate::model::LogDensity;

/// Find a starting point with a finite log density and gradient.
///
/// The first half of the attempts jitter the moment point by
/// `U(-jitter, jitter)` in every coordinate; the rest draw uniformly from
/// `(-2, 2)` like Stan does.
pub(crate) fn initial_point<R: Rng>(
    density: &LogDensity<'_>,
    jitter: f64,
    rng: &mut R,
) -> Result<Vec<f64>, SamplingError> {
    let moment = density.moment_point()?;
    let mut theta = moment.clone();

    for attempt in 0..MAX_INIT_TRIES {
        theta = if attempt < MAX_INIT_TRIES / 2 {
            moment
                .iter()
                .map(|&m| {
                    let m = if m.is_finite() { m } else { 0.0 };
                    if jitter > 0.0 {
                        m + rng.gen_range(-jitter..jitter)
                    } else {
                        m
                    }
                })
                .collect()
        } else {
            moment.iter().map(|_| rng.gen_range(-2.0..2.0)).collect()
        };

        let (lp, grad) = density.logp_and_grad(&theta);
        if lp.is_finite() && grad.iter().all(|g| g.is_finite()) {
            if attempt > 0 {
                log::debug!("found a finite initial point after {} attempts", attempt + 1);
            }
            return Ok(theta);
        }
    }

    let model = density.model();
    let vars = match density.node_terms(&theta) {
        Ok(terms) => terms
            .into_iter()
            .filter(|(_, lp)| !lp.is_finite())
            .filter_map(|(var, _)| model.node(var).map(|n| n.name().to_owned()))
            .collect(),
        Err(err) => vec![err.to_string()],
    };
    Err(SamplingError::InitialPoint { vars })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DistSpec, ExprExt, Model};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn moment_point_without_jitter() {
        let mut model = Model::new();
        model.add_prior("mu", DistSpec::normal(4.0, 1.0), &[]).unwrap();
        let density = LogDensity::new(&model).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        let theta = initial_point(&density, 0.0, &mut rng).unwrap();
        assert_eq!(theta, vec![4.0]);
    }

    #[test]
    fn jitter_stays_in_range() {
        let mut model = Model::new();
        model.add_prior("mu", DistSpec::normal(4.0, 1.0), &[]).unwrap();
        let density = LogDensity::new(&model).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        let theta = initial_point(&density, 0.5, &mut rng).unwrap();
        assert!((theta[0] - 4.0).abs() < 0.5);
    }

    #[test]
    fn impossible_data_names_the_culprit() {
        let mut model = Model::new();
        let mu = model.add_prior("mu", DistSpec::normal(0.0, 1.0), &[]).unwrap();
        let rate = model.add_deterministic("rate", mu.exp(), &[]).unwrap();
        // negative counts have zero mass under any rate
        model
            .add_likelihood("k", DistSpec::poisson(rate), vec![-1.0], &[])
            .unwrap();
        let density = LogDensity::new(&model).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        match initial_point(&density, 1.0, &mut rng) {
            Err(SamplingError::InitialPoint { vars }) => assert_eq!(vars, vec![String::from("k")]),
            other => panic!("expected an initial point error, got {other:?}"),
        }
    }
}
