pub mod api;
pub mod error;
pub mod http;
pub mod memory;
mod wire;

pub use api::InteractionApi;
pub use error::{ApiError, Result};
pub use http::HttpApi;
pub use memory::MemoryApi;
pub use wire::ErrorDetail;
