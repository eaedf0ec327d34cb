//! Shared primitive types used across the analysis stages

pub mod location;

pub use location::CellLocation;
