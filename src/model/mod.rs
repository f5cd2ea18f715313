//! 领域模型 (Domain Model)

pub mod group;
pub mod options;
pub mod proxy;
pub mod request;
pub mod subscription;

pub use group::{GroupKind, ProxyGroup, RuleProvider};
pub use proxy::{Protocol, Proxy, ProxyType};
pub use request::{
    BuildRequest, ClashFlavor, Replacement, RuleInsertion, RuleProviderInsertion, SortMode,
};
pub use subscription::{NodeList, Subscription};

use serde::{Deserialize, Deserializer};

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

/// 字符串或数字字面量
#[derive(Deserialize)]
#[serde(untagged)]
enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<Literal> for String {
    fn from(lit: Literal) -> Self {
        match lit {
            Literal::Str(s) => s,
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
        }
    }
}

/// 宽松解析：YAML 中的数字带宽值按原样保留为字符串
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Literal::deserialize(deserializer).map(String::from)
}

pub(crate) fn lenient_string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Literal>::deserialize(deserializer)?.map(String::from))
}
