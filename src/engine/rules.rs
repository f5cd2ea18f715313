//! 规则与规则集拼接 (Rule Splicing)
//!
//! 末尾的 `MATCH` 兜底规则在任何追加之后仍保持最后。

use indexmap::IndexMap;

use crate::model::{RuleInsertion, RuleProvider, RuleProviderInsertion, Subscription};
use crate::utils::digest_hex;

/// 规则集默认刷新间隔 (秒)
pub const PROVIDER_INTERVAL: u32 = 3600;

/// 是否为兜底规则 (规则类型为 `MATCH`)
fn is_catch_all(rule: &str) -> bool {
    rule.split(',').next().is_some_and(|kind| kind.trim() == "MATCH")
}

/// 在规则列表头部插入，保持传入顺序
pub fn prepend_rules<I>(doc: &mut Subscription, rules: I)
where
    I: IntoIterator<Item = String>,
{
    let mut head: Vec<String> = rules.into_iter().collect();
    head.append(&mut doc.rules);
    doc.rules = head;
}

/// 追加规则，若末条为兜底规则则插入其前
pub fn append_rules<I>(doc: &mut Subscription, rules: I)
where
    I: IntoIterator<Item = String>,
{
    let tail = if doc.rules.last().is_some_and(|r| is_catch_all(r)) {
        doc.rules.pop()
    } else {
        None
    };
    doc.rules.extend(rules);
    doc.rules.extend(tail);
}

fn rule_set(key: &str, group: &str) -> String {
    format!("RULE-SET,{key},{group}")
}

pub fn prepend_rule_provider(doc: &mut Subscription, key: &str, group: &str, provider: RuleProvider) {
    doc.rule_providers.insert(key.to_string(), provider);
    prepend_rules(doc, [rule_set(key, group)]);
}

pub fn append_rule_provider(doc: &mut Subscription, key: &str, group: &str, provider: RuleProvider) {
    doc.rule_providers.insert(key.to_string(), provider);
    append_rules(doc, [rule_set(key, group)]);
}

/// 由地址生成规则集定义，返回 (摘要, 规则集)
///
/// 同一地址总是得到相同的摘要与缓存路径。
pub fn provider_from_url(url: &str, behavior: &str) -> (String, RuleProvider) {
    let digest = digest_hex(url);
    let provider = RuleProvider {
        kind: "http".to_string(),
        behavior: Some(behavior.to_string()).filter(|b| !b.is_empty()),
        url: Some(url.to_string()),
        path: Some(format!("./{digest}.yaml")),
        interval: Some(PROVIDER_INTERVAL),
        extra: IndexMap::new(),
    };
    (digest, provider)
}

/// 按请求拼接规则，前插与追加两组各自保持声明顺序
///
/// 前插规则作为一批整体放到最前，而不是逐条插到头部；
/// 因此 `[P1, P2]` 得到 `P1, P2, ...`，逐条头插会得到 `P2, P1, ...`。
pub fn splice_rules(doc: &mut Subscription, rules: &[RuleInsertion]) {
    let (head, tail): (Vec<_>, Vec<_>) = rules.iter().partition(|r| r.prepend);
    prepend_rules(doc, head.into_iter().map(|r| r.rule.clone()));
    append_rules(doc, tail.into_iter().map(|r| r.rule.clone()));
}

/// 按请求注册规则集，键名为空时使用地址摘要
///
/// 对应的 `RULE-SET` 规则与 [`splice_rules`] 一样按批次前插，保持声明顺序。
pub fn splice_rule_providers(doc: &mut Subscription, insertions: &[RuleProviderInsertion]) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    for ins in insertions {
        let (digest, provider) = provider_from_url(&ins.url, &ins.behavior);
        let key = if ins.name.trim().is_empty() {
            digest
        } else {
            ins.name.clone()
        };
        let rule = rule_set(&key, &ins.group);
        doc.rule_providers.insert(key, provider);
        if ins.prepend {
            head.push(rule);
        } else {
            tail.push(rule);
        }
    }
    prepend_rules(doc, head);
    append_rules(doc, tail);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(rules: &[&str]) -> Subscription {
        Subscription {
            rules: rules.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn append_goes_before_catch_all() {
        let mut sub = doc(&["DOMAIN,a.com,DIRECT", "MATCH,Proxy"]);
        append_rules(&mut sub, strings(&["DOMAIN,test.com,DIRECT"]));
        assert_eq!(
            sub.rules,
            strings(&["DOMAIN,a.com,DIRECT", "DOMAIN,test.com,DIRECT", "MATCH,Proxy"])
        );

        for i in 0..3 {
            append_rules(&mut sub, [format!("DOMAIN,{i}.com,DIRECT")]);
            assert_eq!(sub.rules.last().map(String::as_str), Some("MATCH,Proxy"));
        }
    }

    #[test]
    fn append_without_catch_all_goes_to_end() {
        let mut sub = doc(&["DOMAIN,a.com,DIRECT", "DOMAIN-KEYWORD,MATCHER,Proxy"]);
        append_rules(&mut sub, strings(&["GEOIP,CN,DIRECT"]));
        assert_eq!(sub.rules.last().map(String::as_str), Some("GEOIP,CN,DIRECT"));

        let mut empty = doc(&[]);
        append_rules(&mut empty, strings(&["MATCH,DIRECT"]));
        assert_eq!(empty.rules, strings(&["MATCH,DIRECT"]));
    }

    #[test]
    fn prepend_keeps_order() {
        let mut sub = doc(&["MATCH,Proxy"]);
        prepend_rules(&mut sub, strings(&["A", "B"]));
        assert_eq!(sub.rules, strings(&["A", "B", "MATCH,Proxy"]));
    }

    #[test]
    fn splice_batches_by_direction() {
        let mut sub = doc(&["DOMAIN,a.com,DIRECT", "MATCH,Proxy"]);
        let rules = vec![
            RuleInsertion { rule: "P1".into(), prepend: true },
            RuleInsertion { rule: "A1".into(), prepend: false },
            RuleInsertion { rule: "P2".into(), prepend: true },
            RuleInsertion { rule: "A2".into(), prepend: false },
        ];
        splice_rules(&mut sub, &rules);
        assert_eq!(
            sub.rules,
            strings(&["P1", "P2", "DOMAIN,a.com,DIRECT", "A1", "A2", "MATCH,Proxy"])
        );
    }

    #[test]
    fn provider_identifier_is_stable_digest() {
        let (a, provider) = provider_from_url("https://example.com/reject.yaml", "domain");
        let (b, _) = provider_from_url("https://example.com/reject.yaml", "classical");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(provider.path, Some(format!("./{a}.yaml")));
        assert_eq!(provider.kind, "http");
        assert_eq!(provider.interval, Some(3600));
    }

    #[test]
    fn providers_register_and_splice_rule_set() {
        let mut sub = doc(&["MATCH,Proxy"]);
        let insertions = vec![
            RuleProviderInsertion::builder()
                .name("reject")
                .group("REJECT")
                .url("https://example.com/reject.yaml")
                .behavior("domain")
                .prepend(true)
                .build(),
            RuleProviderInsertion::builder()
                .group("Proxy")
                .url("https://example.com/proxy.yaml")
                .behavior("domain")
                .build(),
        ];
        splice_rule_providers(&mut sub, &insertions);

        let digest = digest_hex("https://example.com/proxy.yaml");
        assert_eq!(
            sub.rules,
            vec![
                "RULE-SET,reject,REJECT".to_string(),
                format!("RULE-SET,{digest},Proxy"),
                "MATCH,Proxy".to_string(),
            ]
        );
        let keys: Vec<&str> = sub.rule_providers.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["reject", digest.as_str()]);

        let yaml = sub.to_yaml().unwrap();
        assert!(yaml.contains("rule-providers:"));
        assert!(yaml.contains("behavior: domain"));
    }

    #[test]
    fn explicit_provider_calls_share_semantics() {
        let mut sub = doc(&["MATCH,DIRECT"]);
        let (_, provider) = provider_from_url("https://example.com/ads.yaml", "domain");
        append_rule_provider(&mut sub, "ads", "REJECT", provider.clone());
        prepend_rule_provider(&mut sub, "ads2", "REJECT", provider);
        assert_eq!(
            sub.rules,
            strings(&["RULE-SET,ads2,REJECT", "RULE-SET,ads,REJECT", "MATCH,DIRECT"])
        );
    }
}
