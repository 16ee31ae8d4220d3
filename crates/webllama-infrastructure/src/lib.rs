//! Infrastructure layer for WebLlama: platform paths, atomic file
//! storage, and configuration loading.

pub mod config_storage;
pub mod paths;
pub mod storage;

pub use config_storage::ConfigStorage;
pub use paths::WebllamaPaths;
pub use storage::FileKeyValueStorage;
