use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::proxy::Socks5;
use crate::model::{Protocol, Proxy, ProxyType};
use crate::utils::{decode_base64, encode_base64};

use super::common::{LinkBuilder, ShareLink, non_empty, percent_encode, strip_prefix};

/// SOCKS5 解码器
pub struct SocksDecoder;

const PREFIXES: &[&str] = &["socks://"];

impl ProxyDecoder for SocksDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::Socks5
    }

    fn supports_legacy(&self) -> bool {
        true
    }

    fn supports_extended(&self) -> bool {
        true
    }

    fn decode(&self, _config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError> {
        strip_prefix(raw, PREFIXES)?;
        let link = ShareLink::parse(raw, raw)?;
        let q = &link.query;

        // `user:pass@` 为明文，只有单段时按 base64(`user:pass`) 处理
        let (username, password) = match &link.password {
            Some(pass) => (link.username.clone(), pass.clone()),
            None if link.username.is_empty() => (String::new(), String::new()),
            None => {
                let decoded = decode_base64(&link.username)
                    .map_err(|e| ParseError::structure(format!("userinfo: {e}"), raw))?;
                match decoded.split_once(':') {
                    Some((user, pass)) => (user.to_string(), pass.to_string()),
                    None => (decoded, String::new()),
                }
            }
        };

        let socks = Socks5 {
            server: link.host.clone(),
            port: link.port,
            username: non_empty(&username),
            password: non_empty(&password),
            tls: q.flag("tls", "true"),
            udp: q.flag("udp", "true"),
            ..Default::default()
        };

        Ok(Proxy::new(link.remarks(), Protocol::Socks5(socks)))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::Socks5(s) = &proxy.protocol else {
            return None;
        };
        let mut link = LinkBuilder::new("socks", &s.server, s.port, &proxy.name);
        if let Some(user) = &s.username {
            let info = format!("{user}:{}", s.password.as_deref().unwrap_or_default());
            link = link.userinfo(percent_encode(&encode_base64(&info)));
        }
        if s.tls {
            link = link.param("tls", "true");
        }
        if s.udp {
            link = link.param("udp", "true");
        }
        Some(link.build())
    }
}
