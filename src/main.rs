//! Headless playground: paints an XOR pattern, trains on it, and prints the
//! loss curve and an ASCII view of the decision grid.
//!
//! Usage:
//!   cargo run -- [layers] [activation] [ticks]
//!   cargo run -- 2,8,8,1 tanh 300
use std::process::ExitCode;

use log::error;
use rand::Rng;

use ferrite_playground::{LabeledPoint, Session, SessionConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let mut config = SessionConfig {
        activation: "tanh".into(),
        steps_per_tick: 20,
        ..SessionConfig::default()
    };
    config.optimizer.learning_rate = 0.05;
    if let Some(layers) = args.next() {
        config.layers = layers;
    }
    if let Some(activation) = args.next() {
        config.activation = activation;
    }
    let ticks: usize = args.next().and_then(|t| t.parse().ok()).unwrap_or(300);

    match run(config, ticks) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: SessionConfig, ticks: usize) -> ferrite_playground::Result<()> {
    let mut session = Session::new();
    session.build(config)?;

    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let x: f64 = rng.gen_range(-0.9..0.9);
        let y: f64 = rng.gen_range(-0.9..0.9);
        let label = ((x > 0.0) != (y > 0.0)) as u8;
        session.add_point(LabeledPoint::new(x, y, label))?;
    }

    println!("Training {:?} on {} XOR points", session.model().map(|m| m.sizes()), session.points().len());
    for tick in 0..ticks {
        let stats = session.tick()?;
        if tick % 50 == 0 || tick + 1 == ticks {
            println!("step {:>6}: loss = {:.6}", stats.step_count, stats.avg_loss);
        }
    }

    let grid = session.decision_grid(24)?;
    for row in grid.probabilities.chunks(grid.resolution) {
        let line: String = row
            .iter()
            .map(|&p| match p {
                p if p < 0.25 => '.',
                p if p < 0.5 => ':',
                p if p < 0.75 => '+',
                _ => '#',
            })
            .collect();
        println!("{line}");
    }
    Ok(())
}
