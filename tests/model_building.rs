use genmodel::model::{DistSpec, ExprExt, Model, ModelError, Role};
use genmodel::Error;

#[test]
fn likelihood_must_match_its_dims() {
    let mut model = Model::new();
    model.add_coord_len("obs", 100).unwrap();
    let mu = model.add_prior("mu", DistSpec::normal(0.0, 1.0), &[]).unwrap();
    let err = model
        .add_likelihood("y", DistSpec::normal(mu, 1.0), vec![0.0; 90], &["obs"])
        .unwrap_err();
    match err {
        ModelError::ShapeMismatch { name, expected, got } => {
            assert_eq!(name, "y");
            assert_eq!(expected, vec![100]);
            assert_eq!(got, vec![90]);
        }
        other => panic!("expected a shape mismatch, got {other:?}"),
    }
    // the failed registration leaves nothing behind
    assert!(model.var("y").is_none());
}

#[test]
fn names_are_unique_across_nodes_and_coords() {
    let mut model = Model::new();
    model.add_coord_len("obs", 3).unwrap();
    model.add_prior("mu", DistSpec::normal(0.0, 1.0), &[]).unwrap();
    assert!(matches!(
        model.add_prior("mu", DistSpec::normal(0.0, 1.0), &[]),
        Err(ModelError::NameCollision { .. })
    ));
    assert!(matches!(
        model.add_coord_len("obs", 4),
        Err(ModelError::NameCollision { .. })
    ));
    // a node may not reuse a coordinate name, nor the other way around
    assert_eq!(
        model.add_prior("obs", DistSpec::normal(0.0, 1.0), &[]),
        Err(ModelError::NameCollision {
            name: String::from("obs")
        })
    );
    assert_eq!(
        model.add_coord_len("mu", 3),
        Err(ModelError::NameCollision {
            name: String::from("mu")
        })
    );
    assert!(model.var("obs").is_none());
    assert!(model.coord("mu").is_none());
}

#[test]
fn handles_are_tagged_with_their_role() {
    let mut model = Model::new();
    let x = model.add_data("x", vec![1.0, 2.0], &[]).unwrap();
    let b = model.add_prior("b", DistSpec::normal(0.0, 1.0), &[]).unwrap();
    let mu = model.add_deterministic("mu", b * x, &[]).unwrap();
    let y = model
        .add_likelihood("y", DistSpec::normal(mu, 1.0), vec![1.0, 2.0], &[])
        .unwrap();

    assert_eq!(x.role(), Role::Data);
    assert_eq!(b.role(), Role::Prior);
    assert_eq!(mu.role(), Role::Deterministic);
    assert_eq!(y.role(), Role::Likelihood);
    assert_eq!(model.var("mu"), Some(mu));
    assert_eq!(model.shape_of(mu), &[2]);
    assert_eq!(model.nodes().len(), 4);
    assert_eq!(model.n_free(), 1);
}

#[test]
fn handles_only_point_backwards() {
    // Every dependency of a node was registered before it
    let mut model = Model::new();
    let a = model.add_prior("a", DistSpec::normal(0.0, 1.0), &[]).unwrap();
    let b = model.add_prior("b", DistSpec::normal(a, 1.0), &[]).unwrap();
    let c = model.add_deterministic("c", (a + b).exp(), &[]).unwrap();
    for node_var in [a, b, c] {
        let node = model.node(node_var).unwrap();
        let deps = node
            .dist()
            .map(|d| d.params().iter().flat_map(|p| p.dependencies()).collect::<Vec<_>>())
            .or_else(|| node.expr().map(|e| e.dependencies()))
            .unwrap_or_default();
        assert!(deps.iter().all(|d| d.id() < node_var.id()));
    }
}

#[test]
fn discrete_priors_are_rejected() {
    let mut model = Model::new();
    assert!(matches!(
        model.add_prior("k", DistSpec::poisson(3.0), &[]),
        Err(ModelError::DiscretePrior { .. })
    ));
}

#[test]
fn unknown_dims_are_rejected() {
    let mut model = Model::new();
    assert!(matches!(
        model.add_prior("beta", DistSpec::normal(0.0, 1.0), &["covariate"]),
        Err(ModelError::UnknownDim { .. })
    ));
}

#[test]
fn set_data_resizes_downstream_nodes() {
    let mut model = Model::new();
    model.add_coord_len("obs", 3).unwrap();
    let x = model.add_data("x", vec![0.0, 1.0, 2.0], &["obs"]).unwrap();
    let b = model.add_prior("b", DistSpec::normal(0.0, 1.0), &[]).unwrap();
    let mu = model.add_deterministic("mu", b * x, &["obs"]).unwrap();

    model.set_data("x", vec![5.0; 7], &[]).unwrap();
    assert_eq!(model.shape_of(mu), &[7]);
    assert_eq!(model.coord("obs").unwrap().len(), 7);

    // only data nodes can be swapped
    assert!(matches!(
        model.set_data("b", 1.0, &[]),
        Err(ModelError::NotData { .. })
    ));
}

#[test]
fn covariates_and_observations_on_one_coord_swap_together() {
    let mut model = Model::new();
    model.add_coord_len("obs", 5).unwrap();
    let x = model
        .add_data("x", vec![0.0, 1.0, 2.0, 3.0, 4.0], &["obs"])
        .unwrap();
    let y = model
        .add_data("y", vec![0.1, 1.2, 1.9, 3.1, 4.0], &["obs"])
        .unwrap();
    let b = model.add_prior("b", DistSpec::normal(0.0, 1.0), &[]).unwrap();
    let lik = model
        .add_likelihood("lik", DistSpec::normal(b * x, 1.0), y, &["obs"])
        .unwrap();

    // one at a time, the other node still pins the old length
    let before = model.clone();
    assert!(matches!(
        model.set_data("x", vec![5.0, 6.0], &[]),
        Err(ModelError::ShapeMismatch { .. })
    ));
    assert_eq!(model, before);

    let x_new = ndarray::arr1(&[5.0, 6.0]).into_dyn();
    let y_new = ndarray::arr1(&[5.2, 5.9]).into_dyn();
    let labels = vec![String::from("t5"), String::from("t6")];
    model
        .set_data_many(&[("x", x_new), ("y", y_new.clone())], &[("obs", labels.clone())])
        .unwrap();
    assert_eq!(model.coord("obs"), Some(labels.as_slice()));
    assert_eq!(model.shape_of(lik), &[2]);
    assert_eq!(model.node(y).and_then(|n| n.value()), Some(&y_new));

    // a bad entry anywhere in the batch leaves the model untouched
    let before = model.clone();
    let err = model
        .set_data_many(&[("x", ndarray::arr1(&[1.0]).into_dyn()), ("b", y_new)], &[])
        .unwrap_err();
    assert!(matches!(err, ModelError::NotData { .. }));
    assert_eq!(model, before);
}

#[test]
fn errors_convert_into_the_crate_error() {
    fn build() -> genmodel::Result<Model> {
        let mut model = Model::new();
        model.add_prior("mu", DistSpec::normal(0.0, 1.0), &["missing"])?;
        Ok(model)
    }
    assert!(matches!(build(), Err(Error::Model(ModelError::UnknownDim { .. }))));
}
