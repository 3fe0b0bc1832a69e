use serde::Serialize;

use crate::error::{Error, Result};
use crate::network::mlp::Mlp;

/// Default samples per side.
pub const DEFAULT_RESOLUTION: usize = 80;

/// Temperature of the tanh squash applied to the raw score.
const TEMPERATURE: f64 = 10.0;
/// Extra stretch around 0.5 to narrow the grey band.
const CONTRAST: f64 = 1.15;

const CLASS0_RGB: [f64; 3] = [90.0, 140.0, 235.0];
const CLASS1_RGB: [f64; 3] = [235.0, 80.0, 90.0];

/// The model's class-1 probability sampled on an `n × n` grid over
/// [-1, 1]², row-major, top row first (`y = 1`).
#[derive(Debug, Clone, Serialize)]
pub struct DecisionGrid {
    pub resolution: usize,
    pub probabilities: Vec<f64>,
}

impl DecisionGrid {
    pub fn sample(model: &Mlp, resolution: usize) -> Result<DecisionGrid> {
        if resolution < 2 {
            return Err(Error::InvalidConfig(format!(
                "grid resolution must be at least 2, got {resolution}"
            )));
        }

        let span = (resolution - 1) as f64;
        let mut probabilities = Vec::with_capacity(resolution * resolution);
        for iy in 0..resolution {
            let y = -((iy as f64 / span) * 2.0 - 1.0);
            for ix in 0..resolution {
                let x = (ix as f64 / span) * 2.0 - 1.0;
                let score = model.forward(&[x, y])?.as_slice()[0];
                probabilities.push(class_probability(score));
            }
        }
        Ok(DecisionGrid { resolution, probabilities })
    }

    pub fn colors(&self) -> Vec<[u8; 3]> {
        self.probabilities.iter().map(|&p| blend_color(p)).collect()
    }
}

/// Maps a raw network score to [0, 1]: `0.5·(tanh(10v) + 1)`, stretched by
/// the contrast factor and clamped.
pub fn class_probability(score: f64) -> f64 {
    let p = 0.5 * ((TEMPERATURE * score).tanh() + 1.0);
    (0.5 + (p - 0.5) * CONTRAST).clamp(0.0, 1.0)
}

/// Linear blend from the class-0 colour (`p = 0`) to the class-1 colour.
pub fn blend_color(p: f64) -> [u8; 3] {
    let mut rgb = [0u8; 3];
    for (out, (c0, c1)) in rgb.iter_mut().zip(CLASS0_RGB.iter().zip(CLASS1_RGB.iter())) {
        *out = (c0 * (1.0 - p) + c1 * p).round() as u8;
    }
    rgb
}
