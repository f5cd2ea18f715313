use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::proxy::Hysteria;
use crate::model::{Protocol, Proxy, ProxyType};

use super::common::{LinkBuilder, ShareLink, split_list, strip_prefix};

/// Hysteria (v1) 解码器
pub struct HysteriaDecoder;

const PREFIXES: &[&str] = &["hysteria://"];

/// 与 Go `strconv.ParseBool` 相同的取值集合
fn parse_bool(s: &str) -> bool {
    matches!(s, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

impl ProxyDecoder for HysteriaDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::Hysteria
    }

    fn supports_legacy(&self) -> bool {
        false
    }

    fn supports_extended(&self) -> bool {
        true
    }

    fn decode(&self, _config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError> {
        strip_prefix(raw, PREFIXES)?;
        let link = ShareLink::parse(raw, raw)?;
        let q = &link.query;

        let hysteria = Hysteria {
            server: link.host.clone(),
            port: link.port,
            protocol: q.opt("protocol"),
            // 带宽保持字面量，不做数值解析
            up: q.get("upmbps").to_string(),
            down: q.get("downmbps").to_string(),
            auth: q.opt("auth"),
            auth_str: q.opt("auth-str"),
            obfs: q.opt("obfs"),
            sni: q.opt("peer"),
            skip_cert_verify: parse_bool(q.get("insecure")),
            alpn: split_list(q.get("alpn")),
            ..Default::default()
        };

        Ok(Proxy::new(link.remarks(), Protocol::Hysteria(hysteria)))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::Hysteria(h) = &proxy.protocol else {
            return None;
        };
        let mut link = LinkBuilder::new("hysteria", &h.server, h.port, &proxy.name)
            .param_opt("protocol", h.protocol.as_deref())
            .param_opt("auth", h.auth.as_deref())
            .param_opt("auth-str", h.auth_str.as_deref())
            .param_opt("peer", h.sni.as_deref())
            .param_opt("upmbps", Some(h.up.as_str()))
            .param_opt("downmbps", Some(h.down.as_str()))
            .param_opt("obfs", h.obfs.as_deref());
        if let Some(alpn) = &h.alpn {
            link = link.param("alpn", alpn.join(","));
        }
        if h.skip_cert_verify {
            link = link.param("insecure", "1");
        }
        Some(link.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn decode(raw: &str) -> Result<Proxy, ParseError> {
        HysteriaDecoder.decode(&DecodeConfig::default(), raw)
    }

    fn hysteria(proxy: &Proxy) -> &Hysteria {
        match &proxy.protocol {
            Protocol::Hysteria(h) => h,
            other => panic!("unexpected protocol {other:?}"),
        }
    }

    #[test]
    fn auth_string_and_literal_bandwidth() {
        let proxy = decode(
            "hysteria://proxy.example.com:443?protocol=wechat-video&auth-str=myauth&upmbps=50&downmbps=200&insecure=true#Hysteria%20Auth",
        )
        .unwrap();
        assert_eq!(proxy.name, "Hysteria Auth");
        assert_eq!(
            hysteria(&proxy),
            &Hysteria {
                server: "proxy.example.com".into(),
                port: 443,
                protocol: Some("wechat-video".into()),
                auth_str: Some("myauth".into()),
                up: "50".into(),
                down: "200".into(),
                skip_cert_verify: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn alpn_list_and_peer() {
        let proxy = decode(
            "hysteria://[2001:db8::1]:8080?auth=password123&upmbps=100&downmbps=100&alpn=h3,h2,http/1.1&peer=sni.example.com&insecure=yes",
        )
        .unwrap();
        let h = hysteria(&proxy);
        assert_eq!(h.server, "2001:db8::1");
        assert_eq!(h.alpn.as_ref().map(Vec::len), Some(3));
        assert_eq!(h.sni.as_deref(), Some("sni.example.com"));
        assert!(!h.skip_cert_verify);
    }

    #[test]
    fn error_kinds() {
        assert_eq!(decode("hysteria://:8080?auth=x").unwrap_err().kind, ParseErrorKind::InvalidStructure);
        assert_eq!(decode("hysteria://127.0.0.1?auth=x").unwrap_err().kind, ParseErrorKind::InvalidStructure);
        assert_eq!(decode("hysteria://127.0.0.1:99999?auth=x").unwrap_err().kind, ParseErrorKind::InvalidPort);
        assert_eq!(decode("hysteria2://example.com:8080").unwrap_err().kind, ParseErrorKind::InvalidPrefix);
    }

    #[test]
    fn encoded_link_decodes_to_same_proxy() {
        let proxy = decode("hysteria://h.example.com:443?auth=pw&upmbps=20&downmbps=100&obfs=xplus&alpn=h3&insecure=1#HY").unwrap();
        let again = decode(&HysteriaDecoder.encode(&proxy).unwrap()).unwrap();
        assert_eq!(again, proxy);
    }
}
