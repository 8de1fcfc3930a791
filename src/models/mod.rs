// src/models/mod.rs

pub mod assessment;
pub mod level;
pub mod question;
pub mod response;
pub mod session;
