//! Bayesian linear regression on synthetic data.
//!
//! Run with `RUST_LOG=info cargo run --release --example linear_regression`
use genmodel::prelude::*;
use genmodel::trace::POSTERIOR_PREDICTIVE;
use ndarray::arr1;

fn main() {
    env_logger::init();

    // y = 5 + 2x + N(0, 1) over x in [0, 10]
    let process = LinearProcess::new(5.0, 2.0, Noise::Normal { sigma: 1.0 })
        .with_x_range(0.0, 10.0);
    let synth = process.generate(100, 0xABCD).unwrap();
    println!("true parameters: {}", synth.truth);

    let xs = synth.data.column("x").unwrap().to_vec();
    let ys = synth.data.column("y").unwrap().to_vec();

    let mut model = Model::new();
    model.add_coord_len("obs", xs.len()).unwrap();
    let x = model.add_data("x", xs, &["obs"]).unwrap();
    let intercept = model
        .add_prior("intercept", DistSpec::normal(0.0, 20.0), &[])
        .unwrap();
    let slope = model
        .add_prior("slope", DistSpec::normal(0.0, 20.0), &[])
        .unwrap();
    let sigma = model
        .add_prior("sigma", DistSpec::half_cauchy(10.0), &[])
        .unwrap();
    model
        .add_likelihood("y", DistSpec::normal(intercept + slope * x, sigma), ys, &["obs"])
        .unwrap();
    println!("{model}");

    // Where the optimizer lands is a good sanity check before sampling
    let map = find_map(&model, &MapConfig::default()).unwrap();
    for (name, value) in map.values() {
        println!("MAP {name} = {:.3}", value.sum());
    }

    let engine = MCMCEngine::new(SamplerConfig::default());
    let mut idata = engine.sample(&model, 1337).unwrap();

    let summary = summarize(idata.posterior().unwrap(), &SummaryConfig::default());
    println!("{summary}");
    println!("{}", ConvergenceReport::from(&idata));

    // Predict at new covariates; the posterior group is left alone
    let new_x = arr1(&[11.0, 12.0, 13.0]).into_dyn();
    let preds = predictive_resample(
        &model,
        idata.posterior().unwrap(),
        &[("x", new_x.clone())],
        7,
    )
    .unwrap();
    let y = preds.get("y").unwrap();
    for (i, x) in new_x.iter().enumerate() {
        let draws = y.element_draws(i);
        let (lo, hi) = genmodel::diagnostics::hdi(&draws, 0.94);
        println!(
            "y({x}) ~ {:.2} [{lo:.2}, {hi:.2}]",
            genmodel::misc::mean(&draws)
        );
    }
    idata.add_group(POSTERIOR_PREDICTIVE, preds).unwrap();

    let path = std::env::temp_dir().join("linear_regression.json");
    idata.save(&path).unwrap();
    println!("trace written to {}", path.display());
}
