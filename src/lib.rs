//! Clash 订阅转换库 (Subscription Converter)
//!
//! 解码各协议分享链接，聚合多个订阅源，按国家/地区分组并合并进 Clash 配置模板。

pub mod core;
pub mod decoders;
pub mod engine;
pub mod interfaces;
pub mod model;
pub mod network;
pub mod utils;

pub use crate::core::error::{ErrorKind, ParseError, ParseErrorKind, Result, SubError};
pub use decoders::DecoderRegistry;
pub use engine::SubscriptionAssembler;
pub use model::{BuildRequest, ClashFlavor, Proxy, Subscription};
