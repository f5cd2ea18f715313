use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::options::{GrpcOptions, H2Options, WsOptions};
use crate::model::proxy::Vmess;
use crate::model::{Protocol, Proxy, ProxyType};
use crate::utils::{decode_base64, encode_base64};

use super::common::{alpn_list, non_empty, parse_port, query_unescape, remarks_or_default, split_list, strip_prefix};

/// VMess 解码器 (v2rayN Base64 JSON 格式)
pub struct VmessDecoder;

const PREFIXES: &[&str] = &["vmess://"];

/// v2rayN 分享格式，`port` 与 `aid` 可能为字符串或数字
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VmessJson {
    ps: String,
    add: String,
    port: Value,
    id: String,
    aid: Value,
    scy: String,
    net: String,
    host: String,
    path: String,
    tls: String,
    sni: String,
    alpn: String,
    fp: String,
}

impl ProxyDecoder for VmessDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::Vmess
    }

    fn supports_legacy(&self) -> bool {
        true
    }

    fn supports_extended(&self) -> bool {
        true
    }

    fn decode(&self, config: &DecodeConfig, raw: &str) -> Result<Proxy, ParseError> {
        let body = strip_prefix(raw, PREFIXES)?;
        let decoded = decode_base64(body).map_err(|e| ParseError::base64(e.to_string(), raw))?;
        let v: VmessJson = serde_json::from_str(&decoded)
            .map_err(|e| ParseError::structure(format!("json: {e}"), raw))?;

        let port = match &v.port {
            Value::String(s) => parse_port(s, raw)?,
            Value::Number(n) => n
                .as_u64()
                .and_then(|p| u16::try_from(p).ok())
                .filter(|p| *p != 0)
                .ok_or_else(|| ParseError::port(format!("`{n}` out of range"), raw))?,
            _ => return Err(ParseError::structure("missing server port", raw)),
        };

        let alter_id = match &v.aid {
            Value::String(s) if s.is_empty() => 0,
            Value::String(s) => s
                .parse()
                .map_err(|_| ParseError::structure(format!("invalid aid `{s}`"), raw))?,
            Value::Number(n) => n
                .as_u64()
                .and_then(|a| u32::try_from(a).ok())
                .ok_or_else(|| ParseError::structure(format!("invalid aid `{n}`"), raw))?,
            _ => 0,
        };

        if v.add.is_empty() {
            return Err(ParseError::structure("missing server host", raw));
        }

        let mut vmess = Vmess {
            server: v.add.clone(),
            port,
            uuid: v.id.clone(),
            alter_id,
            cipher: if v.scy.is_empty() { "auto".into() } else { v.scy.clone() },
            udp: config.use_udp,
            tls: v.tls == "tls",
            alpn: alpn_list(&v.alpn),
            servername: non_empty(&v.sni),
            client_fingerprint: non_empty(&v.fp),
            ..Default::default()
        };

        match v.net.as_str() {
            "ws" => {
                let path = if v.path.is_empty() { "/" } else { &v.path };
                let host = if v.host.is_empty() { &v.add } else { &v.host };
                vmess.network = Some("ws".into());
                vmess.ws_opts = Some(WsOptions {
                    path: Some(path.to_string()),
                    headers: [("Host".to_string(), host.to_string())].into_iter().collect(),
                    ..Default::default()
                });
            }
            "grpc" => {
                vmess.network = Some("grpc".into());
                vmess.grpc_opts = Some(GrpcOptions {
                    grpc_service_name: non_empty(&v.path),
                });
            }
            "h2" => {
                vmess.network = Some("h2".into());
                vmess.h2_opts = Some(H2Options {
                    host: split_list(&v.host).unwrap_or_default(),
                    path: non_empty(&v.path),
                });
            }
            _ => {}
        }

        let name = query_unescape(&v.ps);
        Ok(Proxy::new(
            remarks_or_default(Some(name.as_str()), &v.add, port),
            Protocol::Vmess(vmess),
        ))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::Vmess(vm) = &proxy.protocol else {
            return None;
        };
        let (net, host, path) = match vm.network.as_deref() {
            Some("ws") => {
                let ws = vm.ws_opts.as_ref();
                (
                    "ws",
                    ws.and_then(WsOptions::host).unwrap_or_default().to_string(),
                    ws.and_then(|w| w.path.clone()).unwrap_or_default(),
                )
            }
            Some("grpc") => (
                "grpc",
                String::new(),
                vm.grpc_opts
                    .as_ref()
                    .and_then(|g| g.grpc_service_name.clone())
                    .unwrap_or_default(),
            ),
            Some("h2") => {
                let h2 = vm.h2_opts.as_ref();
                (
                    "h2",
                    h2.map(|h| h.host.join(",")).unwrap_or_default(),
                    h2.and_then(|h| h.path.clone()).unwrap_or_default(),
                )
            }
            _ => ("tcp", String::new(), String::new()),
        };

        let ps: String = url::form_urlencoded::byte_serialize(proxy.name.as_bytes()).collect();
        let body = json!({
            "v": "2",
            "ps": ps,
            "add": vm.server,
            "port": vm.port,
            "id": vm.uuid,
            "aid": vm.alter_id,
            "scy": vm.cipher,
            "net": net,
            "type": "none",
            "host": host,
            "path": path,
            "tls": if vm.tls { "tls" } else { "" },
            "sni": vm.servername.clone().unwrap_or_default(),
            "alpn": vm.alpn.as_ref().map(|a| a.join(",")).unwrap_or_default(),
            "fp": vm.client_fingerprint.clone().unwrap_or_default(),
        });
        Some(format!("vmess://{}", encode_base64(&body.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn link(body: Value) -> String {
        format!("vmess://{}", encode_base64(&body.to_string()))
    }

    fn vmess(proxy: &Proxy) -> &Vmess {
        match &proxy.protocol {
            Protocol::Vmess(v) => v,
            other => panic!("unexpected protocol {other:?}"),
        }
    }

    #[test]
    fn string_and_numeric_fields() {
        let raw = link(json!({
            "v": "2", "ps": "US%20West", "add": "us.example.com", "port": "443",
            "id": "b831b0c4-33b7-4873-9834-28d66d87d4ce", "aid": "0", "net": "ws",
            "tls": "tls", "sni": "cdn.example.com", "alpn": "h2,http/1.1", "fp": "chrome"
        }));
        let proxy = VmessDecoder.decode(&DecodeConfig { use_udp: true }, &raw).unwrap();
        assert_eq!(proxy.name, "US West");
        let v = vmess(&proxy);
        assert_eq!(v.port, 443);
        assert_eq!(v.cipher, "auto");
        assert!(v.tls && v.udp);
        assert_eq!(v.servername.as_deref(), Some("cdn.example.com"));
        assert_eq!(v.client_fingerprint.as_deref(), Some("chrome"));
        assert_eq!(v.alpn, Some(vec!["h2".to_string(), "http/1.1".to_string()]));

        let ws = v.ws_opts.as_ref().unwrap();
        assert_eq!(ws.path.as_deref(), Some("/"));
        assert_eq!(ws.host(), Some("us.example.com"));

        let raw = link(json!({"add": "1.2.3.4", "port": 8443, "id": "x", "aid": 64, "scy": "aes-128-gcm"}));
        let proxy = VmessDecoder.decode(&DecodeConfig::default(), &raw).unwrap();
        assert_eq!(proxy.name, "1.2.3.4:8443");
        assert_eq!(vmess(&proxy).alter_id, 64);
        assert_eq!(vmess(&proxy).network, None);
    }

    #[test]
    fn grpc_and_h2_blocks() {
        let raw = link(json!({"add": "a.com", "port": 443, "id": "x", "net": "grpc", "path": "svc"}));
        let proxy = VmessDecoder.decode(&DecodeConfig::default(), &raw).unwrap();
        assert_eq!(
            vmess(&proxy).grpc_opts.as_ref().unwrap().grpc_service_name.as_deref(),
            Some("svc")
        );

        let raw = link(json!({"add": "a.com", "port": 443, "id": "x", "net": "h2", "host": "a.com,b.com", "path": "/h2"}));
        let proxy = VmessDecoder.decode(&DecodeConfig::default(), &raw).unwrap();
        let h2 = vmess(&proxy).h2_opts.as_ref().unwrap();
        assert_eq!(h2.host, vec!["a.com".to_string(), "b.com".to_string()]);
    }

    #[test]
    fn error_kinds() {
        let err = VmessDecoder.decode(&DecodeConfig::default(), "vmess://@@@").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidBase64);

        let raw = format!("vmess://{}", encode_base64("not json"));
        let err = VmessDecoder.decode(&DecodeConfig::default(), &raw).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidStructure);

        let raw = link(json!({"add": "a.com", "port": "99999", "id": "x"}));
        let err = VmessDecoder.decode(&DecodeConfig::default(), &raw).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidPort);

        let raw = link(json!({"add": "a.com", "port": 443, "id": "x", "aid": "zero"}));
        let err = VmessDecoder.decode(&DecodeConfig::default(), &raw).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidStructure);
    }

    #[test]
    fn encoded_link_decodes_to_same_proxy() {
        let raw = link(json!({
            "ps": "JP+Tokyo 01", "add": "jp.example.com", "port": 443, "id": "uuid-1",
            "aid": 0, "net": "ws", "path": "/ray", "host": "cdn.example.com", "tls": "tls"
        }));
        let proxy = VmessDecoder.decode(&DecodeConfig::default(), &raw).unwrap();
        assert_eq!(proxy.name, "JP Tokyo 01");
        let again = VmessDecoder
            .decode(&DecodeConfig::default(), &VmessDecoder.encode(&proxy).unwrap())
            .unwrap();
        assert_eq!(again, proxy);
    }
}
