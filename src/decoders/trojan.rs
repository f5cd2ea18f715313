use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::proxy::Trojan;
use crate::model::{Protocol, Proxy, ProxyType};

use super::common::{LinkBuilder, ShareLink, Transport, alpn_list, reality_from_query, strip_prefix};

/// Trojan 解码器
pub struct TrojanDecoder;

const PREFIXES: &[&str] = &["trojan://"];

impl ProxyDecoder for TrojanDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::Trojan
    }

    fn supports_legacy(&self) -> bool {
        true
    }

    fn supports_extended(&self) -> bool {
        true
    }

    /// UDP 由链接自身的 `udp=true` 决定，不受请求级开关影响
    fn decode(&self, _config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError> {
        strip_prefix(raw, PREFIXES)?;
        let link = ShareLink::parse(raw, raw)?;
        let q = &link.query;

        let mut trojan = Trojan {
            server: link.host.clone(),
            port: link.port,
            password: link.username.clone(),
            udp: q.flag("udp", "true"),
            ..Default::default()
        };

        match q.get("security") {
            "tls" | "xtls" => {
                trojan.alpn = alpn_list(q.get("alpn"));
                trojan.sni = q.opt("sni");
            }
            "reality" => {
                trojan.sni = q.opt("sni");
                trojan.reality_opts = Some(reality_from_query(q));
                trojan.fingerprint = q.opt("fp");
            }
            _ => {}
        }

        let transport = Transport::from_query(q);
        trojan.network = transport.network;
        trojan.ws_opts = transport.ws_opts;
        trojan.grpc_opts = transport.grpc_opts;
        trojan.http_opts = transport.http_opts;

        Ok(Proxy::new(link.remarks(), Protocol::Trojan(trojan)))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::Trojan(t) = &proxy.protocol else {
            return None;
        };
        let mut pairs = Vec::new();
        if let Some(reality) = &t.reality_opts {
            pairs.push(("security", "reality".into()));
            pairs.push(("pbk", reality.public_key.clone()));
            if let Some(sid) = &reality.short_id {
                pairs.push(("sid", sid.clone()));
            }
            if let Some(fp) = &t.fingerprint {
                pairs.push(("fp", fp.clone()));
            }
        } else if t.sni.is_some() || t.alpn.is_some() {
            pairs.push(("security", "tls".into()));
            if let Some(alpn) = &t.alpn {
                pairs.push(("alpn", alpn.join(",")));
            }
        }
        if let Some(sni) = &t.sni {
            pairs.push(("sni", sni.clone()));
        }
        if t.udp {
            pairs.push(("udp", "true".into()));
        }
        Transport::write_query(
            t.network.as_deref(),
            t.ws_opts.as_ref(),
            t.grpc_opts.as_ref(),
            t.http_opts.as_ref(),
            &mut pairs,
        );

        Some(
            LinkBuilder::new("trojan", &t.server, t.port, &proxy.name)
                .user(&t.password)
                .params(pairs)
                .build(),
        )
    }
}
