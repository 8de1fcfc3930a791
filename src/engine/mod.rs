// src/engine/mod.rs

pub mod attempts;
pub mod scoring;
pub mod selector;
pub mod settings;
