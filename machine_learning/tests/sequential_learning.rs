use std::num::NonZeroUsize;

use machine_learning::{
    Agent, Info, SgdAgent, SgdAgentConfig,
    arch::{
        Sequential,
        layers::Layer,
        loss::{CrossEntropy, LossFn, Mse},
    },
    environment::{
        make_random_poly_classification_environment, make_random_poly_regression_environment,
    },
    initialization::ParamInit,
    optimization::{Adam, GradientDescentWithMomentum},
};
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn classification_loss_drops_while_streaming_batches() {
    let mut rng = StdRng::seed_from_u64(0);
    let env = make_random_poly_classification_environment(&mut rng, 3, 100, 100, 2, 2, 1., 10, 10, false)
        .unwrap();

    let nfeatures = env.nfeatures();
    let model = Sequential::new([Layer::dense((nfeatures, 2), None), Layer::log_softmax()]);
    let init = ParamInit::Normal { mean: 0., std: 1. }
        .generate(&mut rng, (nfeatures + 1) * 2)
        .unwrap();

    let config = SgdAgentConfig {
        classification: true,
        obs_noise: 1.,
        buffer_size: NonZeroUsize::new(100),
        ..Default::default()
    };
    let mut agent = SgdAgent::new(model, CrossEntropy, Adam::new(1e-2), config).unwrap();
    let mut belief = agent.init_state(init.clone());

    let initial_preds = agent.apply(&init, env.x_train()).unwrap();
    let initial_loss = CrossEntropy
        .loss(initial_preds.view(), env.y_train())
        .unwrap();

    for t in 0..env.nsteps() {
        let (x, y) = env.get_data(t).unwrap();
        let (new_belief, info) = agent.update(&mut rng, belief, x, y).unwrap();
        belief = new_belief;

        assert!(info.is_trained());
        assert!(info.loss().is_finite());
    }

    let final_preds = agent.apply(&belief.params, env.x_train()).unwrap();
    let final_loss = CrossEntropy.loss(final_preds.view(), env.y_train()).unwrap();

    assert!(agent.classification());
    assert_eq!(final_preds.dim(), (100, 2));
    assert!(
        final_loss < initial_loss,
        "loss went from {initial_loss} to {final_loss}"
    );
}

#[test]
fn regression_waits_for_the_threshold_then_trains() {
    let mut rng = StdRng::seed_from_u64(3);
    let env = make_random_poly_regression_environment(&mut rng, 1, 40, 10, 0.01, 10, 10).unwrap();

    let model = Sequential::new([Layer::dense((env.nfeatures(), 1), None)]);
    let config = SgdAgentConfig {
        buffer_size: NonZeroUsize::new(20),
        threshold: 15,
        nepochs: 50,
        ..Default::default()
    };
    let optimizer = GradientDescentWithMomentum::new(0.05, 0.9);
    let mut agent = SgdAgent::new(model, Mse, optimizer, config).unwrap();
    let mut belief = agent.init_state(vec![0.; 3]);

    let mut infos = Vec::new();
    for t in 0..env.nsteps() {
        let (x, y) = env.get_data(t).unwrap();
        let (new_belief, info) = agent.update(&mut rng, belief, x, y).unwrap();
        belief = new_belief;
        infos.push(info);
    }

    assert_eq!(infos[0], Info::NotEnoughData);
    assert!(infos[1..].iter().all(Info::is_trained));
    assert_eq!(agent.memory().len(), 20);

    let (mu, sigma) = agent.predict(&mut rng, &belief, env.x_test()).unwrap();
    assert_eq!(mu.dim(), (10, 1));
    assert_eq!(sigma.dim(), (10, 1));
}
