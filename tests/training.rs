use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ferrite_playground::{
    Activation, Error, Gradients, LabeledPoint, Mlp, Optimizer, OptimizerConfig, PointSet,
    Session, SessionConfig,
};
use ferrite_playground::train::{train_step, train_tick};

fn quadrant_points() -> PointSet {
    let mut points = PointSet::new();
    for &(x, y) in &[(-0.5, -0.5), (-0.5, 0.5), (0.5, -0.5), (0.5, 0.5)] {
        points.add(LabeledPoint::new(x, y, (x > 0.0) as u8)).unwrap();
    }
    points
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[test]
fn sgd_on_four_points_lowers_the_loss() {
    for seed in [0, 1, 2] {
        let mut model = Mlp::with_seed(&[2, 8, 1], Activation::Relu, seed).unwrap();
        let mut optimizer =
            Optimizer::new(OptimizerConfig::with_learning_rate(0.05), &model).unwrap();
        let points = quadrant_points();
        let mut rng = StdRng::seed_from_u64(seed);

        let losses: Vec<f64> = (0..500)
            .map(|_| {
                let point = *points.sample(&mut rng).unwrap();
                train_step(&mut model, &mut optimizer, &point).unwrap()
            })
            .collect();

        let first = mean(&losses[..50]);
        let last = mean(&losses[450..]);
        assert!(last < first, "seed {seed}: last {last} !< first {first}");
    }
}

#[test]
fn default_optimizer_is_plain_sgd() {
    let mut via_optimizer = Mlp::with_seed(&[2, 5, 3, 1], Activation::Softsign, 99).unwrap();
    let mut via_step = via_optimizer.clone();
    let mut optimizer = Optimizer::new(OptimizerConfig::default(), &via_optimizer).unwrap();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..25 {
        let x = [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
        let y = [rng.gen_range(0..2) as f64];

        let (_, cache) = via_optimizer.forward_training(&x).unwrap();
        let grads = via_optimizer.backward(&y, &cache).unwrap();
        optimizer.apply(&mut via_optimizer, &grads).unwrap();
        via_step.step(&grads, 0.01).unwrap();

        assert_eq!(via_optimizer.layers(), via_step.layers());
    }
}

#[test]
fn every_feature_together_still_trains() {
    let mut model = Mlp::with_seed(&[2, 8, 8, 1], Activation::Tanh, 5).unwrap();
    let config = OptimizerConfig {
        learning_rate: 0.05,
        momentum: 0.9,
        l2: 1e-4,
        weight_decay: 1e-3,
        clip_norm: 1.0,
    };
    let mut optimizer = Optimizer::new(config, &model).unwrap();
    let points = quadrant_points();
    let mut rng = StdRng::seed_from_u64(5);

    let first = train_tick(&mut model, &mut optimizer, &points, 100, &mut rng).unwrap();
    let mut last = first;
    for _ in 0..20 {
        last = train_tick(&mut model, &mut optimizer, &points, 100, &mut rng).unwrap();
    }
    assert!(last.is_finite());
    assert!(last < first, "last {last} !< first {first}");
}

#[test]
fn gradients_from_backward_fit_the_optimizer() {
    let model = Mlp::build(&[2, 4, 1], "swish").unwrap();
    let (_, cache) = model.forward_training(&[0.1, 0.9]).unwrap();
    let grads = model.backward(&[1.0], &cache).unwrap();
    assert_eq!(grads.shapes(), model.param_shapes());
    assert_eq!(Gradients::zeros(&model.param_shapes()).global_norm(), 0.0);
}

#[test]
fn session_end_to_end() {
    let mut session = Session::with_seed(12);
    assert_eq!(
        session.build(SessionConfig { layers: "2,8".into(), ..Default::default() }),
        Err(Error::InvalidLayerSizes(
            "layers must start with 2 and end with 1 (e.g. 2,8,8,1), got [2, 8]".into()
        ))
    );

    session
        .build(SessionConfig {
            layers: "2, 8, 1".into(),
            activation: "relu".into(),
            steps_per_tick: 10,
            ..Default::default()
        })
        .unwrap();
    for p in quadrant_points().as_slice() {
        session.add_point(*p).unwrap();
    }

    let mut losses = Vec::new();
    for _ in 0..50 {
        losses.push(session.tick().unwrap().avg_loss);
    }
    assert_eq!(session.step_count(), 500);

    let run = session.runs().active().unwrap();
    assert_eq!(run.samples.len(), 50);
    assert_eq!(run.name, "Run 1");

    let second = session.new_run().id.clone();
    session.tick().unwrap();
    assert_eq!(session.runs().get(&second).unwrap().samples.len(), 1);
    assert!(session.runs().bounds().is_some());

    let grid = session.decision_grid(10).unwrap();
    assert_eq!(grid.probabilities.len(), 100);
}
