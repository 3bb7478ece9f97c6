//! Todo list REST API over an in-memory store.

pub mod client;
pub mod model;
pub mod routes;
pub mod store;

pub use client::TodoClient;
pub use model::{Todo, TodoInput};
pub use store::TodoStore;
