use crate::core::error::ParseError;
use crate::interfaces::{DecodeConfig, ProxyDecoder};
use crate::model::proxy::ShadowsocksR;
use crate::model::{Protocol, Proxy, ProxyType};
use crate::utils::{decode_base64, encode_base64};

use super::common::{Query, parse_port, remarks_or_default, strip_prefix};

/// ShadowsocksR 解码器
///
/// 链接主体整体 Base64：`server:port:protocol:method:obfs:base64(password)/?params`。
pub struct ShadowsocksRDecoder;

const PREFIXES: &[&str] = &["ssr://"];

/// 从右侧切分为至多 `n` 段，最左段保留剩余的分隔符 (服务器地址可能含冒号)
fn split_n_right(s: &str, sep: char, n: usize) -> Vec<&str> {
    let mut parts: Vec<&str> = s.rsplitn(n, sep).collect();
    parts.reverse();
    parts
}

impl ProxyDecoder for ShadowsocksRDecoder {
    fn prefixes(&self) -> &'static [&'static str] {
        PREFIXES
    }

    fn protocol(&self) -> ProxyType {
        ProxyType::ShadowsocksR
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

        let (server_info, params) = decoded
            .split_once("/?")
            .ok_or_else(|| ParseError::structure("missing `/?` parameter section", raw))?;

        let parts = split_n_right(server_info, ':', 6);
        let [server, port, protocol, cipher, obfs, password] = parts[..] else {
            return Err(ParseError::structure("expected 6 colon-separated fields", raw));
        };

        let password = decode_base64(password)
            .map_err(|e| ParseError::structure(format!("password: {e}"), raw))?;
        let port = parse_port(port, raw)?;

        let query = Query::parse(params);
        let decode_param = |key: &str| -> Result<Option<String>, ParseError> {
            match query.opt(key) {
                Some(v) => decode_base64(&v)
                    .map(Some)
                    .map_err(|e| ParseError::structure(format!("{key}: {e}"), raw)),
                None => Ok(None),
            }
        };
        let obfs_param = decode_param("obfsparam")?;
        let protocol_param = decode_param("protoparam")?;
        let remarks = decode_param("remarks")?;

        Ok(Proxy::new(
            remarks_or_default(remarks.as_deref(), server, port),
            Protocol::ShadowsocksR(ShadowsocksR {
                server: server.to_string(),
                port,
                cipher: cipher.to_string(),
                password,
                obfs: obfs.to_string(),
                obfs_param: obfs_param.filter(|s| !s.is_empty()),
                protocol: protocol.to_string(),
                protocol_param: protocol_param.filter(|s| !s.is_empty()),
                udp: config.use_udp,
            }),
        ))
    }

    fn encode(&self, proxy: &Proxy) -> Option<String> {
        let Protocol::ShadowsocksR(ssr) = &proxy.protocol else {
            return None;
        };
        let mut params = vec![format!("remarks={}", encode_base64(&proxy.name))];
        if let Some(p) = &ssr.obfs_param {
            params.push(format!("obfsparam={}", encode_base64(p)));
        }
        if let Some(p) = &ssr.protocol_param {
            params.push(format!("protoparam={}", encode_base64(p)));
        }
        let body = format!(
            "{}:{}:{}:{}:{}:{}/?{}",
            ssr.server,
            ssr.port,
            ssr.protocol,
            ssr.cipher,
            ssr.obfs,
            encode_base64(&ssr.password),
            params.join("&")
        );
        Some(format!("ssr://{}", encode_base64(&body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn decode(raw: &str) -> Result<Proxy, ParseError> {
        ShadowsocksRDecoder.decode(&DecodeConfig::default(), raw)
    }

    #[test]
    fn simple_link() {
        // 127.0.0.1:443:origin:aes-192-cfb:plain:MTIzMTIz/?group=ZGVmYXVsdA&remarks=SEFIQQ
        let proxy = decode("ssr://MTI3LjAuMC4xOjQ0MzpvcmlnaW46YWVzLTE5Mi1jZmI6cGxhaW46TVRJek1USXovP2dyb3VwPVpHVm1ZWFZzZEEmcmVtYXJrcz1TRUZJUVE").unwrap();
        assert_eq!(proxy.name, "HAHA");
        let Protocol::ShadowsocksR(ssr) = &proxy.protocol else {
            panic!("expected ssr");
        };
        assert_eq!(ssr.server, "127.0.0.1");
        assert_eq!(ssr.port, 443);
        assert_eq!(ssr.protocol, "origin");
        assert_eq!(ssr.cipher, "aes-192-cfb");
        assert_eq!(ssr.obfs, "plain");
        assert_eq!(ssr.password, "123123");
        assert_eq!(ssr.obfs_param, None);
    }

    #[test]
    fn server_keeps_inner_colons() {
        let proxy = decode("ssr://WzIwMDE6MGRiODo4NWEzOjAwMDA6MDAwMDo4YTJlOjAzNzA6NzMzNF06NDQzOm9yaWdpbjphZXMtMTkyLWNmYjpwbGFpbjpNVEl6TVRJei8/Z3JvdXA9WkdWbVlYVnNkQSZyZW1hcmtzPVNFRklRUQ").unwrap();
        assert_eq!(proxy.server(), "[2001:0db8:85a3:0000:0000:8a2e:0370:7334]");
        assert_eq!(proxy.port(), 443);
    }

    #[test]
    fn split_from_right() {
        assert_eq!(split_n_right("a:b:c", ':', 6), vec!["a", "b", "c"]);
        assert_eq!(
            split_n_right("x:y:1:2:3:4:5", ':', 6),
            vec!["x:y", "1", "2", "3", "4", "5"]
        );
    }

    #[test]
    fn malformed_bodies() {
        assert_eq!(decode("ssr://not*base64!").unwrap_err().kind, ParseErrorKind::InvalidBase64);
        // 可解码但缺少参数段
        assert_eq!(decode("ssr://invalid_base64").unwrap_err().kind, ParseErrorKind::InvalidStructure);

        let no_params = format!("ssr://{}", encode_base64("1.2.3.4:443:origin:aes-128-cfb:plain:cGFzcw"));
        assert_eq!(decode(&no_params).unwrap_err().kind, ParseErrorKind::InvalidStructure);

        let bad_port = format!("ssr://{}", encode_base64("1.2.3.4:70000:origin:aes-128-cfb:plain:cGFzcw/?"));
        assert_eq!(decode(&bad_port).unwrap_err().kind, ParseErrorKind::InvalidPort);
    }

    #[test]
    fn default_name_and_round_trip() {
        let link = format!("ssr://{}", encode_base64("1.2.3.4:443:auth_aes128_md5:aes-128-cfb:tls1.2_ticket_auth:cGFzcw/?obfsparam=Y2RuLmV4YW1wbGUuY29t"));
        let proxy = decode(&link).unwrap();
        assert_eq!(proxy.name, "1.2.3.4:443");
        let Protocol::ShadowsocksR(ssr) = &proxy.protocol else {
            panic!("expected ssr");
        };
        assert_eq!(ssr.obfs_param.as_deref(), Some("cdn.example.com"));
        assert_eq!(ssr.password, "pass");

        let again = decode(&ShadowsocksRDecoder.encode(&proxy).unwrap()).unwrap();
        assert_eq!(again, proxy);
    }
}
