//! Data types shared across the decoding pipeline.

pub mod cert;
pub mod report;
pub mod secret;

pub use cert::*;
pub use report::*;
pub use secret::*;
