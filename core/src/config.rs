use std::env;

/// Knobs for shape inference, handed to op builders by the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InferenceConfig {
    /// Reject slices whose end is before their begin with a non-negative
    /// stride, instead of collapsing them to a single element.
    pub strict_slices: bool,
}

impl InferenceConfig {
    /// Default configuration, amended by `SHAPEINF_STRICT_SLICES`.
    pub fn from_env() -> InferenceConfig {
        let mut config = InferenceConfig::default();
        if let Ok(v) = env::var("SHAPEINF_STRICT_SLICES") {
            config.strict_slices = v == "true" || v == "1";
        }
        config
    }

    pub fn with_strict_slices(self, strict_slices: bool) -> InferenceConfig {
        InferenceConfig { strict_slices, ..self }
    }
}
