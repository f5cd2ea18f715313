use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::proxy::Shadowsocks;
use crate::model::{Protocol, Proxy, ProxyType};
use crate::utils::{decode_base64, encode_base64, is_likely_base64};

use super::common::{LinkBuilder, ShareLink, strip_prefix};

/// Shadowsocks 解码器
///
/// 支持 SIP002 (`ss://base64(method:password)@host:port`)、明文用户信息
/// 以及整体 Base64 的旧格式 (`ss://base64(method:password@host:port)#name`)。
pub struct ShadowsocksDecoder;

const PREFIXES: &[&str] = &["ss://"];

impl ProxyDecoder for ShadowsocksDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::Shadowsocks
    }

    fn supports_legacy(&self) -> bool {
        true
    }

    fn supports_extended(&self) -> bool {
        true
    }

    fn decode(&self, config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError> {
        let body = strip_prefix(raw, PREFIXES)?;

        let expanded;
        let link = if body.contains('@') {
            raw
        } else {
            let (encoded, fragment) = match body.split_once('#') {
                Some((e, f)) => (e, Some(f)),
                None => (body, None),
            };
            let decoded = decode_base64(encoded)
                .map_err(|e| ParseError::structure(format!("url parse error: {e}"), raw))?;
            expanded = match fragment {
                Some(f) => format!("ss://{decoded}#{f}"),
                None => format!("ss://{decoded}"),
            };
            expanded.as_str()
        };

        let link = ShareLink::parse(link, raw)?;

        let mut cipher = link.username.clone();
        let mut password = link.password.clone().unwrap_or_default();
        if password.is_empty()
            && let Ok(user) = decode_base64(&cipher)
            && let Some((m, p)) = user.split_once(':')
        {
            password = p.to_string();
            cipher = m.to_string();
        }
        if is_likely_base64(&password) {
            password = decode_base64(&password)
                .map_err(|_| ParseError::structure("password decode error", raw))?;
        }

        Ok(Proxy::new(
            link.remarks(),
            Protocol::Shadowsocks(Shadowsocks {
                server: link.host,
                port: link.port,
                cipher,
                password,
                udp: config.use_udp,
                ..Default::default()
            }),
        ))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::Shadowsocks(ss) = &proxy.protocol else {
            return None;
        };
        let userinfo = encode_base64(&format!("{}:{}", ss.cipher, ss.password));
        Some(
            LinkBuilder::new("ss", &ss.server, ss.port, &proxy.name)
                .userinfo(userinfo)
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn decode(raw: &str) -> Result<Proxy, ParseError> {
        ShadowsocksDecoder.decode(&DecodeConfig::default(), raw)
    }

    fn ss(proxy: &Proxy) -> &Shadowsocks {
        match &proxy.protocol {
            Protocol::Shadowsocks(s) => s,
            other => panic!("unexpected protocol {other:?}"),
        }
    }

    #[test]
    fn sip002_link() {
        let proxy = decode("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@127.0.0.1:8080").unwrap();
        assert_eq!(proxy.name, "127.0.0.1:8080");
        let s = ss(&proxy);
        assert_eq!(s.server, "127.0.0.1");
        assert_eq!(s.port, 8080);
        assert_eq!(s.cipher, "aes-256-gcm");
        assert_eq!(s.password, "password");
        assert!(!s.udp);
    }

    #[test]
    fn fully_encoded_legacy_link() {
        let proxy = decode("ss://YWVzLTI1Ni1nY206cGFzc3dvcmRAbG9jYWxob3N0OjgwODA=#Local%20SS").unwrap();
        assert_eq!(proxy.name, "Local SS");
        assert_eq!(ss(&proxy).server, "localhost");
        assert_eq!(ss(&proxy).password, "password");
    }

    #[test]
    fn plaintext_user_info_and_ipv6() {
        let proxy = decode("ss://chacha20-poly1305:mypassword@server.com:443#ChaCha20").unwrap();
        assert_eq!(ss(&proxy).cipher, "chacha20-poly1305");
        assert_eq!(ss(&proxy).password, "mypassword");
        assert_eq!(proxy.name, "ChaCha20");

        let proxy = decode("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@[2001:db8::1]:8080").unwrap();
        assert_eq!(ss(&proxy).server, "2001:db8::1");
        assert_eq!(proxy.name, "2001:db8::1:8080");
    }

    #[test]
    fn udp_follows_config() {
        let proxy = ShadowsocksDecoder
            .decode(
                &DecodeConfig { use_udp: true },
                "ss://aes-256-gcm:password@192.168.1.1:8080",
            )
            .unwrap();
        assert!(ss(&proxy).udp);
    }

    #[test]
    fn missing_host_or_port() {
        let err = decode("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@:8080").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidStructure);
        let err = decode("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@127.0.0.1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidStructure);
        let err = decode("http://example.com:8080").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidPrefix);
    }

    #[test]
    fn encoded_link_decodes_to_same_proxy() {
        let proxy = decode("ss://aes-128-gcm:s3cr3t!@hk.example.com:8388#HK 01").unwrap();
        let link = ShadowsocksDecoder.encode(&proxy).unwrap();
        assert_eq!(decode(&link).unwrap(), proxy);
    }
}
