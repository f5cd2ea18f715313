pub mod decoder;
pub mod loader;

pub use decoder::{DecodeConfig, ProxyDecoder};
pub use loader::{FetchOptions, SourceLoader};
