pub mod affine_fit;
pub mod pipeline;
pub mod plot;
pub mod reconciler;
pub mod report;
pub mod shape_optimizer;
pub mod synth_utils;
