pub mod access;
pub mod account;
pub mod config;
pub mod conversation;
pub mod error;
pub mod io;
pub mod paths;
pub mod presentation;
pub mod scenario;
pub mod script;
pub mod types;
pub mod view;

pub use error::{ParleyError, Result};
