//! Generation request parameters and their validation.

use serde::Serialize;
use validator::Validate;

/// Stock negative prompt applied when the caller does not supply one.
pub const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, low quality, deformed, artifacts, extra limbs";

/// Default sampler seed.
pub const DEFAULT_SEED: i64 = 42;
/// Default number of inference steps.
pub const DEFAULT_STEPS: u32 = 30;
/// Default classifier-free guidance scale.
pub const DEFAULT_GUIDANCE: f64 = 4.0;
/// Default output edge length in pixels.
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Parameters for one generation job submission.
///
/// Ranges match what the generation UI enforces: steps 10-50, guidance
/// 0-10, dimensions 64-2048.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct GenerationRequest {
    /// Text prompt describing the desired image.
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,

    /// Negative prompt steering the sampler away from unwanted content.
    #[validate(length(max = 2000))]
    pub negative_prompt: String,

    /// Sampler seed; the same seed and parameters reproduce an image.
    pub seed: i64,

    /// Inference step count.
    #[validate(range(min = 10, max = 50))]
    pub steps: u32,

    /// Classifier-free guidance scale.
    #[validate(range(min = 0.0, max = 10.0))]
    pub guidance: f64,

    /// Output width in pixels.
    #[validate(range(min = 64, max = 2048))]
    pub width: u32,

    /// Output height in pixels.
    #[validate(range(min = 64, max = 2048))]
    pub height: u32,
}

impl GenerationRequest {
    /// A request for `prompt` with stock defaults for everything else.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            seed: DEFAULT_SEED,
            steps: DEFAULT_STEPS,
            guidance: DEFAULT_GUIDANCE,
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
