//! 代理节点模型 (Proxy Model)
//!
//! 以 `type` 为判别字段的封闭标签联合，序列化时仅输出当前协议的字段。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::options::{GrpcOptions, H2Options, HttpOptions, RealityOptions, WsOptions};
use super::{is_false, lenient_string, lenient_string_opt};

/// 协议类型判别值
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum ProxyType {
    #[strum(serialize = "ss")]
    Shadowsocks,
    #[strum(serialize = "ssr")]
    ShadowsocksR,
    #[strum(serialize = "vmess")]
    Vmess,
    #[strum(serialize = "vless")]
    Vless,
    #[strum(serialize = "trojan")]
    Trojan,
    #[strum(serialize = "hysteria")]
    Hysteria,
    #[strum(serialize = "hysteria2")]
    Hysteria2,
    #[strum(serialize = "socks5")]
    Socks5,
    #[strum(serialize = "anytls")]
    AnyTls,
}

/// 代理节点 (名称 + 协议载荷)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    pub name: String,
    #[serde(flatten)]
    pub protocol: Protocol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Protocol {
    #[serde(rename = "ss")]
    Shadowsocks(Shadowsocks),
    #[serde(rename = "ssr")]
    ShadowsocksR(ShadowsocksR),
    #[serde(rename = "vmess")]
    Vmess(Vmess),
    #[serde(rename = "vless")]
    Vless(Vless),
    #[serde(rename = "trojan")]
    Trojan(Trojan),
    #[serde(rename = "hysteria")]
    Hysteria(Hysteria),
    #[serde(rename = "hysteria2")]
    Hysteria2(Hysteria2),
    #[serde(rename = "socks5")]
    Socks5(Socks5),
    #[serde(rename = "anytls")]
    AnyTls(AnyTls),
}

impl Proxy {
    pub fn new(name: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            name: name.into(),
            protocol,
        }
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.protocol.proxy_type()
    }

    pub fn server(&self) -> &str {
        match &self.protocol {
            Protocol::Shadowsocks(p) => &p.server,
            Protocol::ShadowsocksR(p) => &p.server,
            Protocol::Vmess(p) => &p.server,
            Protocol::Vless(p) => &p.server,
            Protocol::Trojan(p) => &p.server,
            Protocol::Hysteria(p) => &p.server,
            Protocol::Hysteria2(p) => &p.server,
            Protocol::Socks5(p) => &p.server,
            Protocol::AnyTls(p) => &p.server,
        }
    }

    pub fn port(&self) -> u16 {
        match &self.protocol {
            Protocol::Shadowsocks(p) => p.port,
            Protocol::ShadowsocksR(p) => p.port,
            Protocol::Vmess(p) => p.port,
            Protocol::Vless(p) => p.port,
            Protocol::Trojan(p) => p.port,
            Protocol::Hysteria(p) => p.port,
            Protocol::Hysteria2(p) => p.port,
            Protocol::Socks5(p) => p.port,
            Protocol::AnyTls(p) => p.port,
        }
    }
}

impl Protocol {
    pub fn proxy_type(&self) -> ProxyType {
        match self {
            Protocol::Shadowsocks(_) => ProxyType::Shadowsocks,
            Protocol::ShadowsocksR(_) => ProxyType::ShadowsocksR,
            Protocol::Vmess(_) => ProxyType::Vmess,
            Protocol::Vless(_) => ProxyType::Vless,
            Protocol::Trojan(_) => ProxyType::Trojan,
            Protocol::Hysteria(_) => ProxyType::Hysteria,
            Protocol::Hysteria2(_) => ProxyType::Hysteria2,
            Protocol::Socks5(_) => ProxyType::Socks5,
            Protocol::AnyTls(_) => ProxyType::AnyTls,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Shadowsocks {
    pub server: String,
    pub port: u16,
    pub cipher: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<IndexMap<String, serde_yml::Value>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp_over_tcp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_over_tcp_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowsocksR {
    pub server: String,
    pub port: u16,
    pub cipher: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub obfs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs_param: Option<String>,
    #[serde(default)]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_param: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vmess {
    pub server: String,
    pub port: u16,
    pub uuid: String,
    #[serde(rename = "alterId", default)]
    pub alter_id: u32,
    #[serde(default)]
    pub cipher: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_opts: Option<RealityOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_opts: Option<HttpOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h2_opts: Option<H2Options>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<GrpcOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub global_padding: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub authenticated_length: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vless {
    pub server: String,
    pub port: u16,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_opts: Option<RealityOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_opts: Option<HttpOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h2_opts: Option<H2Options>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<GrpcOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOptions>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Trojan {
    pub server: String,
    pub port: u16,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_opts: Option<RealityOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_opts: Option<HttpOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<GrpcOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Hysteria {
    pub server: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// 上行带宽，保留原始字面量 (如 `100` 或 `100 Mbps`)
    #[serde(default, deserialize_with = "lenient_string")]
    pub up: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub down: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_window_conn: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_window: Option<u64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_mtu_discovery: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub fast_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_interval: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Hysteria2 {
    pub server: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_interval: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub up: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub down: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwnd: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Socks5 {
    pub server: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnyTls {
    pub server: String,
    pub port: u16,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_session_check_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_session_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_idle_session: Option<u32>,
}
