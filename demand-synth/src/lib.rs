pub mod error;
pub mod general;
pub mod synth;

// Re-export commonly used items for convenience
pub use error::{SynthError, SynthResult};
pub use synth::pipeline::synthesize;
pub use synth::synth_utils::{SearchConfig, SynthesisConfig, SynthesisInput, SynthesisOutput};
