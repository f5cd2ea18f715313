use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::proxy::AnyTls;
use crate::model::{Protocol, Proxy, ProxyType};

use super::common::{LinkBuilder, ShareLink, strip_prefix};

/// AnyTLS 解码器，仅 Meta 内核可用
pub struct AnyTlsDecoder;

const PREFIXES: &[&str] = &["anytls://"];

impl ProxyDecoder for AnyTlsDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::AnyTls
    }

    fn supports_legacy(&self) -> bool {
        false
    }

    fn supports_extended(&self) -> bool {
        true
    }

    fn decode(&self, config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError> {
        strip_prefix(raw, PREFIXES)?;
        let link = ShareLink::parse(raw, raw)?;
        let q = &link.query;

        let anytls = AnyTls {
            server: link.host.clone(),
            port: link.port,
            password: link.password.clone().unwrap_or_else(|| link.username.clone()),
            sni: q.opt("sni"),
            skip_cert_verify: q.flag("insecure", "1"),
            udp: config.use_udp,
            ..Default::default()
        };

        Ok(Proxy::new(link.remarks(), Protocol::AnyTls(anytls)))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::AnyTls(a) = &proxy.protocol else {
            return None;
        };
        let mut link = LinkBuilder::new("anytls", &a.server, a.port, &proxy.name)
            .user(&a.password)
            .param_opt("sni", a.sni.as_deref());
        if a.skip_cert_verify {
            link = link.param("insecure", "1");
        }
        Some(link.build())
    }
}
