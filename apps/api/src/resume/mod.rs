pub mod duration;
pub mod normalizer;
pub mod pipeline;
pub mod validator;

pub use pipeline::Pipeline;
