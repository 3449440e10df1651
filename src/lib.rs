//! Library crate for movie-detectives-back, exposing modules for binaries and integration tests.

pub mod clients;
pub mod config;
pub mod dto;
pub mod error;
pub mod quiz;
pub mod routes;
pub mod state;
