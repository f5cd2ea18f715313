//! 策略组与规则集模型 (Proxy Groups & Rule Providers)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::is_false;

/// 自动测速组探测地址
pub const HEALTH_CHECK_URL: &str = "http://www.gstatic.com/generate_204";
pub const HEALTH_CHECK_INTERVAL: u32 = 300;
pub const HEALTH_CHECK_TOLERANCE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GroupKind {
    Select,
    UrlTest,
    Fallback,
    LoadBalance,
    Relay,
}

/// 策略组
///
/// 成员按名称引用，合并时才解析，允许前向引用尚未生成的组。
/// 模板中的未知字段 (`use`、`filter`、`icon` 等) 原样透传。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GroupKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<String>,
    #[serde(skip)]
    pub is_country_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub lazy: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yml::Value>,
}

impl ProxyGroup {
    /// 国家/地区手选组
    pub fn country_select(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: GroupKind::Select,
            proxies: Vec::new(),
            is_country_group: true,
            url: None,
            interval: None,
            tolerance: None,
            lazy: false,
            extra: IndexMap::new(),
        }
    }

    /// 国家/地区自动测速组
    pub fn country_url_test(name: impl Into<String>, lazy: bool) -> Self {
        Self {
            kind: GroupKind::UrlTest,
            url: Some(HEALTH_CHECK_URL.to_string()),
            interval: Some(HEALTH_CHECK_INTERVAL),
            tolerance: Some(HEALTH_CHECK_TOLERANCE),
            lazy,
            ..Self::country_select(name)
        }
    }

    pub fn size(&self) -> usize {
        self.proxies.len()
    }
}

/// 远程规则集
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleProvider {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yml::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_group_keeps_unknown_keys() {
        let yaml = "name: Auto\ntype: url-test\nuse:\n  - provider1\nfilter: HK\nurl: http://cp.cloudflare.com\ninterval: 600\n";
        let group: ProxyGroup = serde_yml::from_str(yaml).unwrap();
        assert_eq!(group.kind, GroupKind::UrlTest);
        assert!(group.proxies.is_empty());
        assert_eq!(group.interval, Some(600));
        assert!(!group.is_country_group);
        assert!(group.extra.contains_key("use"));

        let out = serde_yml::to_string(&group).unwrap();
        assert!(out.contains("filter: HK"));
        assert!(out.contains("provider1"));
    }

    #[test]
    fn url_test_group_carries_health_check_settings() {
        let group = ProxyGroup::country_url_test("Japan", true);
        assert!(group.is_country_group);
        assert_eq!(group.url.as_deref(), Some(HEALTH_CHECK_URL));
        assert_eq!(group.interval, Some(300));
        assert_eq!(group.tolerance, Some(50));

        let out = serde_yml::to_string(&group).unwrap();
        assert!(out.contains("type: url-test"));
        assert!(out.contains("lazy: true"));
        assert!(!out.contains("is_country_group"));
    }
}
