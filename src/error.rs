/// Everything that can go wrong in the playground library.
///
/// Configuration errors (`InvalidActivation`, `InvalidLayerSizes`,
/// `InvalidConfig`) are raised while building a model or optimizer, before any
/// computation runs. `ShapeMismatch` means a model, its inputs and its
/// optimizer disagree about dimensions; it is a programming error and callers
/// are expected to propagate it rather than recover.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unknown activation `{0}`")]
    InvalidActivation(String),

    #[error("invalid layer sizes: {0}")]
    InvalidLayerSizes(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("no model has been built yet")]
    NoModel,

    #[error("the point set is empty")]
    NoPoints,

    #[error("no run with id `{0}`")]
    UnknownRun(String),
}

pub type Result<T> = std::result::Result<T, Error>;
