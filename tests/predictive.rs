use genmodel::prelude::*;
use genmodel::trace::{Group, POSTERIOR_PREDICTIVE, PRIOR, PRIOR_PREDICTIVE};
use ndarray::arr1;

fn fitted() -> (Model, InferenceData) {
    let xs: Vec<f64> = (0..20).map(f64::from).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 1.0 + 0.5 * x + 0.1 * (x * 3.0).sin()).collect();
    let mut model = Model::new();
    model.add_coord_len("obs", xs.len()).unwrap();
    let x = model.add_data("x", xs, &["obs"]).unwrap();
    let a = model.add_prior("a", DistSpec::normal(0.0, 5.0), &[]).unwrap();
    let b = model.add_prior("b", DistSpec::normal(0.0, 5.0), &[]).unwrap();
    let sigma = model.add_prior("sigma", DistSpec::half_normal(1.0), &[]).unwrap();
    let mu = model.add_deterministic("mu", a + b * x, &["obs"]).unwrap();
    model
        .add_likelihood("y", DistSpec::normal(mu, sigma), ys, &["obs"])
        .unwrap();
    let engine = MCMCEngine::new(
        SamplerConfig::default()
            .with_chains(2)
            .with_draws(200)
            .with_tune(300),
    );
    let idata = engine.sample(&model, 10).unwrap();
    (model, idata)
}

fn mean_of(group: &Group, name: &str, element: usize) -> f64 {
    genmodel::misc::mean(&group.get(name).unwrap().element_draws(element))
}

#[test]
fn same_seed_same_predictions() {
    let (model, idata) = fitted();
    let posterior = idata.posterior().unwrap();
    let first = predictive_resample(&model, posterior, &[], 99).unwrap();
    let second = predictive_resample(&model, posterior, &[], 99).unwrap();
    assert_eq!(first, second);

    let other = predictive_resample(&model, posterior, &[], 100).unwrap();
    assert_ne!(first, other);
    // different seeds, same distribution
    for i in [0, 10, 19] {
        let sd = genmodel::misc::std_dev(&first.get("y").unwrap().element_draws(i));
        assert::close(mean_of(&first, "y", i), mean_of(&other, "y", i), 4.0 * sd / 20.0);
    }
}

#[test]
fn forecasting_leaves_the_posterior_untouched() {
    let (model, mut idata) = fitted();
    let before = idata.posterior().unwrap().clone();

    let new_x = arr1(&[20.0, 21.0, 22.0, 23.0]).into_dyn();
    let preds = predictive_resample(
        &model,
        idata.posterior().unwrap(),
        &[("x", new_x)],
        5,
    )
    .unwrap();
    idata.add_group(POSTERIOR_PREDICTIVE, preds).unwrap();

    assert_eq!(idata.posterior().unwrap(), &before);
    // the caller's model is not modified either
    assert_eq!(model.coord("obs").unwrap().len(), 20);

    let preds = idata.group(POSTERIOR_PREDICTIVE).unwrap();
    let y = preds.get("y").unwrap();
    assert_eq!(y.values().shape(), &[2, 200, 4]);
    // the line keeps going up
    assert!(mean_of(preds, "y", 3) > mean_of(preds, "y", 0));
    assert::close(mean_of(preds, "y", 0), 1.0 + 0.5 * 20.0, 1.0);
}

#[test]
fn forecasting_with_swappable_observations() {
    let xs: Vec<f64> = (0..10).map(f64::from).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 0.2 * (x * 5.0).cos()).collect();
    let mut model = Model::new();
    model.add_coord_len("obs", xs.len()).unwrap();
    let x = model.add_data("x", xs, &["obs"]).unwrap();
    let y = model.add_data("y_obs", ys, &["obs"]).unwrap();
    let b = model.add_prior("b", DistSpec::normal(0.0, 5.0), &[]).unwrap();
    model
        .add_likelihood("y", DistSpec::normal(b * x, 0.5), y, &["obs"])
        .unwrap();
    let engine = MCMCEngine::new(
        SamplerConfig::default()
            .with_chains(1)
            .with_draws(100)
            .with_tune(100),
    );
    let idata = engine.sample(&model, 3).unwrap();

    let new_x = arr1(&[10.0, 11.0]).into_dyn();
    let placeholder = arr1(&[0.0, 0.0]).into_dyn();
    let preds = predictive_resample(
        &model,
        idata.posterior().unwrap(),
        &[("x", new_x), ("y_obs", placeholder)],
        4,
    )
    .unwrap();
    assert_eq!(preds.get("y").unwrap().event_shape(), &[2]);
    assert::close(mean_of(&preds, "y", 1), 22.0, 1.0);
}

#[test]
fn prior_predictive_groups() {
    let (model, _) = fitted();
    let idata = sample_prior_predictive(&model, 300, 1).unwrap();
    let prior = idata.group(PRIOR).unwrap();
    let predictive = idata.group(PRIOR_PREDICTIVE).unwrap();
    assert_eq!(prior.n_chains(), 1);
    assert_eq!(prior.n_draws(), 300);
    assert!(prior.get("a").is_some());
    assert!(prior.get("mu").is_some());
    assert!(predictive.get("y").is_some());
    assert!(predictive.get("a").is_none());

    // a ~ N(0, 5)
    let a = prior.get("a").unwrap().element_draws(0);
    assert::close(genmodel::misc::mean(&a), 0.0, 1.0);
    assert::close(genmodel::misc::std_dev(&a), 5.0, 0.8);
}
