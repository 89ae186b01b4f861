//! Compression engine support: progress merging and the synthetic ticker

pub mod progress;

pub use progress::{ProgressMerger, SyntheticTicker, TickerSettings};
