//! 分享链接解码器注册表 (Decoder Registry)
//!
//! 按前缀将单条分享链接分发至对应协议的解码器。注册表构建后只读，通过 `Arc` 共享。

use std::sync::Arc;

use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::{ClashFlavor, Proxy, ProxyType};

pub mod anytls;
pub mod common;
pub mod hysteria;
pub mod hysteria2;
pub mod shadowsocks;
pub mod shadowsocksr;
pub mod socks;
pub mod trojan;
pub mod vless;
pub mod vmess;

pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn ProxyDecoder>>,
    /// (前缀, 解码器下标)，按前缀长度降序
    prefixes: Vec<(&'static str, usize)>,
}

impl DecoderRegistry {
    /// 内置全部九种协议
    pub fn new() -> Self {
        let mut registry = Self {
            decoders: Vec::new(),
            prefixes: Vec::new(),
        };
        registry.register(shadowsocks::ShadowsocksDecoder);
        registry.register(shadowsocksr::ShadowsocksRDecoder);
        registry.register(vmess::VmessDecoder);
        registry.register(vless::VlessDecoder);
        registry.register(trojan::TrojanDecoder);
        registry.register(hysteria::HysteriaDecoder);
        registry.register(hysteria2::Hysteria2Decoder);
        registry.register(socks::SocksDecoder);
        registry.register(anytls::AnyTlsDecoder);
        registry
    }

    pub fn register<D>(&mut self, decoder: D)
    where
        D: ProxyDecoder + 'static,
    {
        let index = self.decoders.len();
        for prefix in decoder.prefixes() {
            self.prefixes.push((*prefix, index));
        }
        // 稳定排序：等长前缀保持注册顺序
        self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self.decoders.push(Arc::new(decoder));
    }

    /// 解码单条链接
    pub fn decode(&self, config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError> {
        let line = raw.trim();
        if line.is_empty() {
            return Err(ParseError::structure("empty link", raw));
        }
        let (_, index) = self
            .prefixes
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .ok_or_else(|| ParseError::prefix(line))?;
        self.decoders[*index].decode(config, line)
    }

    /// 逐行解码，跳过空行，遇到首个错误即返回
    pub fn decode_all<I, S>(&self, config: &DecodeConfig, lines: I) -> Result<Vec<Proxy>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter(|line| !line.as_ref().trim().is_empty())
            .map(|line| self.decode(config, line.as_ref()))
            .collect()
    }

    pub fn prefixes(&self) -> Vec<&'static str> {
        self.prefixes.iter().map(|(p, _)| *p).collect()
    }

    /// 目标内核支持的协议类型
    pub fn supported_types(&self, flavor: ClashFlavor) -> Vec<ProxyType> {
        self.decoders
            .iter()
            .filter(|d| match flavor {
                ClashFlavor::Clash => d.supports_legacy(),
                ClashFlavor::Meta => d.supports_extended(),
            })
            .map(|d| d.protocol())
            .collect()
    }

    /// 重新编码为分享链接，无对应解码器时返回 `None`
    pub fn encode(&self, proxy: &Proxy) -> Option<String> {
        let kind = proxy.proxy_type();
        self.decoders
            .iter()
            .find(|d| d.protocol() == kind)
            .and_then(|d| d.encode(proxy))
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
