//! Input checks run before a request reaches the pipeline.

mod validator;

pub use validator::{DEFAULT_MAX_MESSAGE_BYTES, Validator};
