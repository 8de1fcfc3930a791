// src/handlers/mod.rs

pub mod levels;
pub mod results;
pub mod sessions;
