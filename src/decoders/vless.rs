use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::proxy::Vless;
use crate::model::{Protocol, Proxy, ProxyType};

use super::common::{LinkBuilder, ShareLink, Transport, alpn_list, reality_from_query, strip_prefix};

/// VLESS 解码器
pub struct VlessDecoder;

const PREFIXES: &[&str] = &["vless://"];

impl ProxyDecoder for VlessDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::Vless
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

        let mut vless = Vless {
            server: link.host.clone(),
            port: link.port,
            uuid: link.username.clone(),
            flow: q.opt("flow"),
            udp: config.use_udp,
            skip_cert_verify: q.flag("allowInsecure", "1"),
            ..Default::default()
        };

        match q.get("security") {
            "tls" => {
                vless.tls = true;
                vless.alpn = alpn_list(q.get("alpn"));
                vless.servername = q.opt("sni");
                vless.client_fingerprint = q.opt("fp");
            }
            "reality" => {
                vless.tls = true;
                vless.servername = q.opt("sni");
                vless.reality_opts = Some(reality_from_query(q));
                vless.client_fingerprint = q.opt("fp");
            }
            _ => {}
        }

        let transport = Transport::from_query(q);
        vless.network = transport.network;
        vless.ws_opts = transport.ws_opts;
        vless.grpc_opts = transport.grpc_opts;
        vless.http_opts = transport.http_opts;

        Ok(Proxy::new(link.remarks(), Protocol::Vless(vless)))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::Vless(v) = &proxy.protocol else {
            return None;
        };
        let mut pairs = Vec::new();
        if let Some(flow) = &v.flow {
            pairs.push(("flow", flow.clone()));
        }
        if let Some(reality) = &v.reality_opts {
            pairs.push(("security", "reality".into()));
            pairs.push(("pbk", reality.public_key.clone()));
            if let Some(sid) = &reality.short_id {
                pairs.push(("sid", sid.clone()));
            }
        } else if v.tls {
            pairs.push(("security", "tls".into()));
            if let Some(alpn) = &v.alpn {
                pairs.push(("alpn", alpn.join(",")));
            }
        }
        if v.tls {
            if let Some(sni) = &v.servername {
                pairs.push(("sni", sni.clone()));
            }
            if let Some(fp) = &v.client_fingerprint {
                pairs.push(("fp", fp.clone()));
            }
        }
        if v.skip_cert_verify {
            pairs.push(("allowInsecure", "1".into()));
        }
        Transport::write_query(
            v.network.as_deref(),
            v.ws_opts.as_ref(),
            v.grpc_opts.as_ref(),
            v.http_opts.as_ref(),
            &mut pairs,
        );

        Some(
            LinkBuilder::new("vless", &v.server, v.port, &proxy.name)
                .user(&v.uuid)
                .params(pairs)
                .build(),
        )
    }
}
