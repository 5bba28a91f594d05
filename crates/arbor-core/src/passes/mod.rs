//! Bundled rewriting passes.

mod infer_types;
mod simplify_types;

pub use infer_types::InferTypes;
pub use simplify_types::SimplifyTypes;
