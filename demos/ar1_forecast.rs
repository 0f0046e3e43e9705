//! Fit an AR(1) with intercept on the head of a series and forecast the
//! held out tail one step ahead.
//!
//! The series is read from `ar1.csv` in the working directory if present,
//! otherwise it is simulated and written there.
use genmodel::prelude::*;
use genmodel::data::DataError;

const PATH: &str = "ar1.csv";
const HOLDOUT: usize = 20;

fn series() -> Dataset {
    match Dataset::load(PATH) {
        Ok(data) => data,
        Err(DataError::NotFound { .. }) => {
            let process = Ar1Process {
                c: 2.0,
                rho: 0.8,
                noise: Noise::Normal { sigma: 0.5 },
            };
            let synth = process.generate(200, 99).unwrap();
            println!("simulated with {}", synth.truth);
            synth.data.save(PATH).unwrap();
            synth.data
        }
        Err(err) => panic!("could not read {PATH}: {err}"),
    }
}

fn main() {
    env_logger::init();

    let data = series();
    let ys = data.column("y").unwrap();
    let n_train = ys.len() - HOLDOUT;

    // y[t] ~ N(c + rho y[t-1], sigma) for t = 1..n_train
    let lag = ys[..n_train - 1].to_vec();
    let next = ys[1..n_train].to_vec();

    let mut model = Model::new();
    model.add_coord_len("time", next.len()).unwrap();
    let y_lag = model.add_data("y_lag", lag, &["time"]).unwrap();
    let c = model.add_prior("c", DistSpec::normal(0.0, 10.0), &[]).unwrap();
    let rho = model
        .add_prior("rho", DistSpec::uniform(-1.0, 1.0), &[])
        .unwrap();
    let sigma = model
        .add_prior("sigma", DistSpec::half_normal(2.0), &[])
        .unwrap();
    model
        .add_likelihood("y", DistSpec::normal(c + rho * y_lag, sigma), next, &["time"])
        .unwrap();

    let engine = MCMCEngine::new(SamplerConfig::default());
    let idata = engine.sample(&model, 5).unwrap();
    println!(
        "{}",
        summarize(idata.posterior().unwrap(), &SummaryConfig::default())
    );

    // Swap in the lags of the held out window and push the posterior
    // through the likelihood
    let test_lag = ys[n_train - 1..ys.len() - 1].to_vec();
    let preds = predictive_resample(
        &model,
        idata.posterior().unwrap(),
        &[("y_lag", ndarray::Array1::from(test_lag).into_dyn())],
        6,
    )
    .unwrap();

    let y = preds.get("y").unwrap();
    let mut covered = 0;
    for (i, actual) in ys[n_train..].iter().enumerate() {
        let draws = y.element_draws(i);
        let (lo, hi) = genmodel::diagnostics::hdi(&draws, 0.94);
        if (lo..=hi).contains(actual) {
            covered += 1;
        }
        println!(
            "t = {:>3}: actual {actual:6.2}, forecast {:6.2} [{lo:6.2}, {hi:6.2}]",
            n_train + i,
            genmodel::misc::mean(&draws)
        );
    }
    println!("{covered}/{HOLDOUT} inside the 94% HDI");
}
