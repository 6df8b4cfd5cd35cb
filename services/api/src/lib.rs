pub mod adapters;
pub mod config;
pub mod error;
pub mod validate;
pub mod web;
