//! 订阅文档聚合根 (Subscription Document)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::group::{ProxyGroup, RuleProvider};
use super::proxy::Proxy;
use crate::core::error::{Result, SubError};

/// 完整的 Clash 配置文档
///
/// 未建模的模板字段 (`port`、`dns`、`tun` 等) 按文档顺序透传。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yml::Value>,
    #[serde(
        rename = "rule-providers",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub rule_providers: IndexMap<String, RuleProvider>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<Proxy>,
    #[serde(
        rename = "proxy-groups",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub proxy_groups: Vec<ProxyGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
}

impl Subscription {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yml::Error> {
        serde_yml::from_str(content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| SubError::MarshalFailed(e.to_string()))
    }
}

/// 仅节点列表输出模式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<Proxy>,
}

impl NodeList {
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| SubError::MarshalFailed(e.to_string()))
    }
}

impl From<Subscription> for NodeList {
    fn from(sub: Subscription) -> Self {
        Self {
            proxies: sub.proxies,
        }
    }
}
