//! Shared pipeline custom action primitives.
//!
//! Job contract and shape checks, artifact location resolution and the zip
//! artifact codec. Nothing here talks to AWS or the Lambda runtime.

pub mod archive;
pub mod artifact_location;
pub mod contract;
