// src/core/mod.rs
pub mod decision;
pub mod engine;
pub mod position;
