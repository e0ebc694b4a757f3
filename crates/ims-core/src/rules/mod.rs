pub mod fields;
pub mod validation;

pub use fields::{Field, FieldErrors};
pub use validation::*;
