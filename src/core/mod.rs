//! Dataset, aggregation primitives and shared types

pub mod aggregate;
pub mod component;
pub mod dataset;
pub mod error;
