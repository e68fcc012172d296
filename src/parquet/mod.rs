//! Handles serialising and saving data to disk in the _parquet_ file format.

pub mod dataset;

pub use dataset::save_dataset;
