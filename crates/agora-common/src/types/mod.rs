//! Core data types for Agora

pub mod activity;
pub mod ids;
pub mod proposal;
pub mod user;
pub mod vote;
