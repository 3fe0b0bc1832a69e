use rand::Rng;

use crate::{
    error::{Error, Result},
    loss::half_mse::HalfMseLoss,
    network::mlp::Mlp,
    optim::optimizer::Optimizer,
    playground::points::{LabeledPoint, PointSet},
};

/// One single-sample SGD update on `point`. Returns the point's loss as seen
/// by the forward pass, before the update.
pub fn train_step(model: &mut Mlp, optimizer: &mut Optimizer, point: &LabeledPoint) -> Result<f64> {
    let input = point.input();
    let target = point.target();

    let (output, cache) = model.forward_training(&input)?;
    let grads = model.backward(&target, &cache)?;
    optimizer.apply(model, &grads)?;

    Ok(HalfMseLoss::loss(output.as_slice(), &target))
}

/// Runs `steps` updates, each on a uniformly drawn point, and returns the
/// average loss. `steps` below 1 is treated as 1.
pub fn train_tick<R: Rng + ?Sized>(
    model: &mut Mlp,
    optimizer: &mut Optimizer,
    points: &PointSet,
    steps: usize,
    rng: &mut R,
) -> Result<f64> {
    let steps = steps.max(1);
    let mut total_loss = 0.0;

    for _ in 0..steps {
        let point = points.sample(rng).ok_or(Error::NoPoints)?;
        total_loss += train_step(model, optimizer, point)?;
    }

    Ok(total_loss / steps as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::optim::optimizer::OptimizerConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tick_without_points_fails() {
        let mut model = Mlp::with_seed(&[2, 3, 1], Activation::Relu, 0).unwrap();
        let mut opt = Optimizer::new(OptimizerConfig::default(), &model).unwrap();
        let before = model.clone();
        let err = train_tick(&mut model, &mut opt, &PointSet::new(), 5, &mut StdRng::seed_from_u64(0));
        assert_eq!(err, Err(Error::NoPoints));
        assert_eq!(model.layers(), before.layers());
    }

    #[test]
    fn repeated_steps_on_one_point_reduce_its_loss() {
        let mut model = Mlp::with_seed(&[2, 4, 1], Activation::Tanh, 8).unwrap();
        let mut opt = Optimizer::new(OptimizerConfig::with_learning_rate(0.1), &model).unwrap();
        let point = LabeledPoint::new(0.3, -0.6, 1);

        let first = train_step(&mut model, &mut opt, &point).unwrap();
        let mut last = first;
        for _ in 0..200 {
            last = train_step(&mut model, &mut opt, &point).unwrap();
        }
        assert!(last < first, "{last} !< {first}");
    }
}
