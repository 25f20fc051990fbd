//! Graph result model.
//!
//! Every transport, whether it scrapes shell output or reads typed driver
//! values, ends up producing a [`GraphResult`]: deduplicated sets of
//! [`Node`] and [`Relation`] snapshots consumed by the rendering layer.

pub mod models;

pub use models::*;
