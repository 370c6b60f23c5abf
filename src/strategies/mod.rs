// src/strategies/mod.rs
pub mod signals;
pub mod traits;
pub mod voting;
