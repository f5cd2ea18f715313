//! 分享链接解码器定义
//!
//! 每种协议实现一个无状态解码器，由注册表按前缀分发。

use crate::core::error::ParseError;
use crate::model::{Proxy, ProxyType};

/// 解码参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeConfig {
    /// 为支持的协议开启 UDP 转发
    pub use_udp: bool,
}

/// 协议解码器 Trait
///
/// - `decode` 将单条分享链接转为规范节点，纯函数，无 I/O。
/// - `encode` 将节点重新编码为分享链接，类型不匹配时返回 `None`。
pub trait ProxyDecoder: Send + Sync {
    /// 声明的链接前缀，如 `ss://`
    fn prefixes(&self) -> &'static [&'static str];

    fn protocol(&self) -> ProxyType;

    /// 原版 Clash 是否支持该协议
    fn supports_legacy(&self) -> bool;

    /// Clash.Meta 是否支持该协议
    fn supports_extended(&self) -> bool;

    fn decode(&self, config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError>;

    fn encode(&self, proxy: &Proxy) -> Option<String>;
}
