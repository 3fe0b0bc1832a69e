use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ferrite_playground::{Activation, HalfMseLoss, Mlp, Optimizer, OptimizerConfig};

/// Four points split by the sign of x, trained with single-sample SGD through
/// the low-level API.
fn main() -> ferrite_playground::Result<()> {
    let mut model = Mlp::with_seed(&[2, 8, 1], Activation::Relu, 7)?;
    let config = OptimizerConfig { momentum: 0.5, clip_norm: 5.0, ..OptimizerConfig::with_learning_rate(0.05) };
    let mut optimizer = Optimizer::new(config, &model)?;

    let inputs = [[-0.5, -0.5], [-0.5, 0.5], [0.5, -0.5], [0.5, 0.5]];
    let labels = [[0.0], [0.0], [1.0], [1.0]];

    let mut rng = StdRng::seed_from_u64(7);
    let mut window = 0.0;
    for step in 1..=1000 {
        let i = rng.gen_range(0..inputs.len());
        let (output, cache) = model.forward_training(&inputs[i])?;
        let grads = model.backward(&labels[i], &cache)?;
        optimizer.apply(&mut model, &grads)?;

        window += HalfMseLoss::loss(output.as_slice(), &labels[i]);
        if step % 100 == 0 {
            println!("Step {step}: loss = {:.6}", window / 100.0);
            window = 0.0;
        }
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, model.forward(input)?.as_slice()[0]);
    }
    Ok(())
}
