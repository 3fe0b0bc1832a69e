use crate::error::{Error, Result};

/// Parses a comma-separated list of layer sizes such as `"2, 8, 8, 1"`.
/// Entries that are not positive integers are skipped.
pub fn parse_layers(text: &str) -> Vec<usize> {
    text.split(',')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .collect()
}

/// The playground feeds `(x, y)` and reads back one score, so a model must
/// start with 2 and end with 1.
pub fn check_playground_sizes(sizes: &[usize]) -> Result<()> {
    match (sizes.first().copied(), sizes.last().copied()) {
        (Some(2), Some(1)) if sizes.len() >= 2 => Ok(()),
        _ => Err(Error::InvalidLayerSizes(format!(
            "layers must start with 2 and end with 1 (e.g. 2,8,8,1), got {:?}",
            sizes
        ))),
    }
}
