// src/services/mod.rs
pub mod broadcast;
pub mod lifecycle;
pub mod relay;
pub mod upstream;
pub mod users;
