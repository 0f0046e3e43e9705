//! Logistic regression fit with mean-field and full-rank ADVI, compared
//! against NUTS.
use genmodel::prelude::*;
use genmodel::data::uniform_covariate;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

fn main() {
    env_logger::init();

    let (true_a, true_b) = (-0.5, 1.5);
    let mut rng = Xoshiro256Plus::seed_from_u64(3);
    let xs = uniform_covariate(500, -3.0, 3.0, &mut rng);
    let ys: Vec<f64> = xs
        .iter()
        .map(|x| {
            let p = 1.0 / (1.0 + (-(true_a + true_b * x)).exp());
            f64::from(u8::from(rng.gen::<f64>() < p))
        })
        .collect();

    let mut model = Model::new();
    model.add_coord_len("obs", xs.len()).unwrap();
    let x = model.add_data("x", xs, &["obs"]).unwrap();
    let a = model.add_prior("a", DistSpec::normal(0.0, 5.0), &[]).unwrap();
    let b = model.add_prior("b", DistSpec::normal(0.0, 5.0), &[]).unwrap();
    model
        .add_likelihood("y", DistSpec::bernoulli((a + b * x).sigmoid()), ys, &["obs"])
        .unwrap();

    println!("true a = {true_a}, b = {true_b}\n");

    for method in [AdviMethod::MeanField, AdviMethod::FullRank] {
        let engine = VariationalEngine::new(AdviConfig::default().with_method(method));
        let fit = engine.fit(&model, 11).unwrap();
        println!(
            "{method}: {} iterations, converged = {}, final ELBO {:.2}",
            fit.n_iter(),
            fit.converged(),
            fit.elbo_history().last().copied().unwrap_or(f64::NAN)
        );
        let idata = engine.sample(&model, 11).unwrap();
        println!(
            "{}",
            summarize(idata.posterior().unwrap(), &SummaryConfig::default())
        );
    }

    let nuts = MCMCEngine::new(SamplerConfig::default().with_chains(2));
    let idata = nuts.sample(&model, 11).unwrap();
    println!("NUTS:");
    println!(
        "{}",
        summarize(idata.posterior().unwrap(), &SummaryConfig::default())
    );
}
