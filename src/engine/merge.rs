//! 模板合并 (Template Merge)
//!
//! 将生成的节点与国家/地区组并入模板，并展开模板策略组中的 `<占位符>`。

use std::collections::HashMap;

use crate::model::Subscription;

use super::country::classify;

/// 成员整体为 `<token>` 时返回其中的 token
fn placeholder(member: &str) -> Option<&str> {
    member.strip_prefix('<')?.strip_suffix('>')
}

/// 合并生成结果到模板
///
/// - `<all>`：全部生成节点名称
/// - `<countries>`：全部国家/地区组名称
/// - `<XX>`：两位代码对应国家/地区组的成员
/// - 其他占位符展开为空
///
/// `ignore_country_groups` 为真时后两类占位符不展开，生成的国家/地区组也不追加。
pub fn merge(template: &mut Subscription, generated: Subscription, ignore_country_groups: bool) {
    let proxy_names: Vec<String> = generated.proxies.iter().map(|p| p.name.clone()).collect();
    let country_groups: HashMap<&str, &[String]> = generated
        .proxy_groups
        .iter()
        .filter(|g| g.is_country_group)
        .map(|g| (g.name.as_str(), g.proxies.as_slice()))
        .collect();
    let country_names: Vec<String> = generated
        .proxy_groups
        .iter()
        .filter(|g| g.is_country_group)
        .map(|g| g.name.clone())
        .collect();

    for group in template.proxy_groups.iter_mut().filter(|g| !g.is_country_group) {
        let mut expanded = Vec::with_capacity(group.proxies.len());
        for member in group.proxies.drain(..) {
            let Some(token) = placeholder(&member) else {
                expanded.push(member);
                continue;
            };
            match token {
                "all" => expanded.extend(proxy_names.iter().cloned()),
                "countries" if !ignore_country_groups => expanded.extend(country_names.iter().cloned()),
                code if !ignore_country_groups && code.len() == 2 => {
                    if let Some(members) = country_groups.get(classify(code)) {
                        expanded.extend(members.iter().cloned());
                    }
                }
                _ => {}
            }
        }
        group.proxies = expanded;
    }

    template.proxies.extend(generated.proxies);
    if !ignore_country_groups {
        template.proxy_groups.extend(generated.proxy_groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grouping::{GroupOptions, auto_group};
    use crate::model::proxy::Socks5;
    use crate::model::{Protocol, Proxy, ProxyType};
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r#"
proxies:
  - name: direct-out
    type: socks5
    server: 10.0.0.1
    port: 1080
proxy-groups:
  - name: Proxy
    type: select
    proxies:
      - DIRECT
      - <countries>
      - <all>
  - name: HK Only
    type: select
    proxies:
      - <hk>
      - <unknown>
      - REJECT
rules:
  - MATCH,Proxy
"#;

    fn generated() -> Subscription {
        let proxies = ["HK 01", "JP 01", "HK 02"]
            .iter()
            .map(|n| Proxy::new(*n, Protocol::Socks5(Socks5::default())))
            .collect();
        auto_group(proxies, &[ProxyType::Socks5], GroupOptions::default())
    }

    fn members<'a>(sub: &'a Subscription, group: &str) -> Vec<&'a str> {
        sub.proxy_groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| g.proxies.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn expands_placeholders_in_place() {
        let mut template = Subscription::from_yaml(TEMPLATE).unwrap();
        merge(&mut template, generated(), false);

        assert_eq!(
            members(&template, "Proxy"),
            vec!["DIRECT", "Hong Kong", "Japan", "HK 01", "JP 01", "HK 02"]
        );
        assert_eq!(members(&template, "HK Only"), vec!["HK 01", "HK 02", "REJECT"]);
        assert_eq!(template.proxies.len(), 4);
        assert_eq!(template.proxies[0].name, "direct-out");

        let names: Vec<&str> = template.proxy_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Proxy", "HK Only", "Hong Kong", "Japan"]);
    }

    #[test]
    fn ignoring_country_groups_keeps_all_expansion() {
        let mut template = Subscription::from_yaml(TEMPLATE).unwrap();
        merge(&mut template, generated(), true);

        assert_eq!(members(&template, "Proxy"), vec!["DIRECT", "HK 01", "JP 01", "HK 02"]);
        assert_eq!(members(&template, "HK Only"), vec!["REJECT"]);
        assert_eq!(template.proxy_groups.len(), 2);
    }

    #[test]
    fn only_whole_member_is_a_placeholder() {
        assert_eq!(placeholder("<all>"), Some("all"));
        assert_eq!(placeholder("prefix <all>"), None);
        assert_eq!(placeholder("<>"), Some(""));
    }
}
