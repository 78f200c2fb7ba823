//! Core simulation primitives (time)

pub mod clock;
