pub mod config;
pub mod practice;
pub mod scenarios;
pub mod serve;
