pub mod app;
pub mod config;
pub mod corpus;
pub mod error;
pub mod search;
pub mod state;

pub use error::{Error, Result};
