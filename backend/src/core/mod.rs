//! Core utilities shared by every component

pub mod time;
