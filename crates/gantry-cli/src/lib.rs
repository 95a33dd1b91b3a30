//! Library components of the gantry CLI.

pub mod logging;
pub mod manifest;
