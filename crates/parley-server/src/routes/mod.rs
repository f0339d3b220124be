pub mod auth;
pub mod events;
pub mod scenarios;
pub mod sessions;
pub mod subscribe;
pub mod views;
