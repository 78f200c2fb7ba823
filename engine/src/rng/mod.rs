//! Deterministic random number generation
//!
//! All randomness in the engine (output variance, efficiency drift, failure
//! draws, risk triggers, GA sampling) MUST go through this module. The
//! generator is explicitly constructed from a seed and threaded through the
//! driver and optimizer as a parameter, never read from a global source.

mod chacha;

pub use chacha::RngManager;
