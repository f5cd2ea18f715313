//! 构建请求参数 (Build Request)

use bon::Builder;

/// 目标内核类型
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ClashFlavor {
    /// 原版 Clash
    Clash,
    /// Clash.Meta / mihomo
    #[default]
    Meta,
}

/// 策略组排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortMode {
    #[default]
    #[strum(to_string = "name-asc", serialize = "nameasc")]
    NameAsc,
    #[strum(to_string = "name-desc", serialize = "namedesc")]
    NameDesc,
    #[strum(to_string = "size-asc", serialize = "sizeasc")]
    SizeAsc,
    #[strum(to_string = "size-desc", serialize = "sizedesc")]
    SizeDesc,
}

/// 节点名称替换规则：`pattern` 为正则，`to` 支持 `$1` 捕获组引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub pattern: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInsertion {
    pub rule: String,
    pub prepend: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct RuleProviderInsertion {
    /// 规则集键名，为空时使用 URL 摘要
    #[builder(default, into)]
    pub name: String,
    #[builder(into)]
    pub group: String,
    #[builder(into)]
    pub url: String,
    #[builder(into)]
    pub behavior: String,
    #[builder(default)]
    pub prepend: bool,
}

/// 单次订阅构建请求
#[derive(Debug, Clone, Default, Builder)]
pub struct BuildRequest {
    /// 订阅地址，可附带 `#标签` 后缀
    #[builder(default)]
    pub subs: Vec<String>,
    /// 内联分享链接
    #[builder(default)]
    pub proxies: Vec<String>,
    /// 模板地址或别名，缺省使用目标内核的默认模板
    #[builder(into)]
    pub template: Option<String>,
    #[builder(into)]
    pub remove: Option<String>,
    #[builder(default)]
    pub replacements: Vec<Replacement>,
    #[builder(default)]
    pub rules: Vec<RuleInsertion>,
    #[builder(default)]
    pub rule_providers: Vec<RuleProviderInsertion>,
    #[builder(default)]
    pub sort: SortMode,
    #[builder(default)]
    pub auto_test: bool,
    #[builder(default)]
    pub lazy: bool,
    #[builder(default)]
    pub ignore_country_group: bool,
    #[builder(default)]
    pub use_udp: bool,
    #[builder(default)]
    pub refresh: bool,
    #[builder(into)]
    pub user_agent: Option<String>,
    #[builder(default)]
    pub node_list: bool,
}
