//! Core Focus library (auth flows, transport, config, logging).

pub mod auth;
pub mod config;
pub mod interrupt;
pub mod logging;
