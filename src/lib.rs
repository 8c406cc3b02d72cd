//! Posts service: a CRUD gateway over a document store and the client-side
//! reducer that mirrors its state.

pub mod app;
pub mod client;
pub mod database;
pub mod endpoints;
pub mod entities;
pub mod extractors;
pub mod utils;

pub use app::create_app;
