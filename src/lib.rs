// fft-pipeline - upload, dispatch and spectrum analysis stages for images on S3

pub mod analysis;
pub mod config;
pub mod dispatcher;
pub mod keys;
pub mod storage;
pub mod types;
pub mod uploader;
pub mod utils;

// Re-exports for convenience
pub use config::{DispatchConfig, StorageConfig};
pub use types::ObjectRef;
