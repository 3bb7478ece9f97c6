pub mod error;
pub mod logging;
pub mod places;
pub mod server;
pub mod statarb;
pub mod todo;

pub use error::{ApiError, StatArbError};
pub use server::{create_app, AppState, ServerConfig};
