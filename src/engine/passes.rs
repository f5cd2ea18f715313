//! 节点列表处理环节 (Proxy List Passes)
//!
//! 依次执行：去重 → 过滤 → 替换 → 重命名。均为纯函数，不做任何 I/O。

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::core::error::{Result, SubError};
use crate::model::{Proxy, Replacement};

/// 为来自带标签订阅源的节点加上前缀
pub fn apply_label(proxies: &mut [Proxy], label: &str) {
    let label = label.trim();
    for proxy in proxies {
        proxy.name = format!("{label} {}", proxy.name.trim());
    }
}

/// 按规范 YAML 序列化结果去重，保留首次出现
///
/// 序列化包含当前名称，配置相同但名称不同的节点不视为重复。
pub fn dedup(proxies: Vec<Proxy>) -> Result<Vec<Proxy>> {
    let mut seen = HashSet::with_capacity(proxies.len());
    let mut out = Vec::with_capacity(proxies.len());
    for proxy in proxies {
        let key = serde_yml::to_string(&proxy).map_err(|e| SubError::MarshalFailed(e.to_string()))?;
        if seen.insert(key) {
            out.push(proxy);
        }
    }
    Ok(out)
}

/// 移除名称匹配 `pattern` 的节点，空白模式不做处理
pub fn filter(proxies: Vec<Proxy>, pattern: Option<&str>) -> Result<Vec<Proxy>> {
    let Some(pattern) = pattern.filter(|p| !p.trim().is_empty()) else {
        return Ok(proxies);
    };
    let re = Regex::new(pattern).map_err(|source| SubError::InvalidRegex {
        param: "remove",
        source,
    })?;
    Ok(proxies.into_iter().filter(|p| !re.is_match(&p.name)).collect())
}

/// 按声明顺序依次应用替换规则，结果逐条累积
///
/// 所有模式先行编译，任一失败则整体放弃。
pub fn replace(proxies: &mut [Proxy], replacements: &[Replacement]) -> Result<()> {
    if replacements.is_empty() {
        return Ok(());
    }
    let compiled = replacements
        .iter()
        .map(|r| {
            Regex::new(&r.pattern)
                .map(|re| (re, r.to.as_str()))
                .map_err(|source| SubError::InvalidRegex {
                    param: "replace",
                    source,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    for proxy in proxies {
        for (re, to) in &compiled {
            if re.is_match(&proxy.name) {
                proxy.name = re.replace_all(&proxy.name, *to).into_owned();
            }
        }
    }
    Ok(())
}

/// 同名节点追加序号 (` 1`、` 2` …)，首次出现的名称保持不变，最后去除首尾空白
pub fn rename(proxies: &mut [Proxy]) {
    let mut counters: HashMap<String, usize> = HashMap::new();
    for proxy in proxies.iter_mut() {
        match counters.get_mut(&proxy.name) {
            Some(count) => {
                *count += 1;
                proxy.name = format!("{} {count}", proxy.name);
            }
            None => {
                counters.insert(proxy.name.clone(), 0);
            }
        }
    }
    for proxy in proxies {
        proxy.name = proxy.name.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Protocol;
    use crate::model::proxy::Socks5;
    use pretty_assertions::assert_eq;

    fn socks(name: &str, port: u16) -> Proxy {
        Proxy::new(
            name,
            Protocol::Socks5(Socks5 {
                server: "127.0.0.1".into(),
                port,
                ..Default::default()
            }),
        )
    }

    fn names(proxies: &[Proxy]) -> Vec<&str> {
        proxies.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn dedup_keeps_first_identical_entry() {
        let input = vec![
            socks("127.0.0.1:1080", 1080),
            socks("127.0.0.1:1080", 1080),
            socks("127.0.0.1:1080", 1081),
            socks("other", 1080),
        ];
        let once = dedup(input).unwrap();
        assert_eq!(once.len(), 3);
        assert_eq!(once[0].port(), 1080);
        assert_eq!(once[1].port(), 1081);

        let twice = dedup(once.clone()).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn filter_drops_matching_names() {
        let input = vec![socks("HK 01", 1), socks("剩余流量: 10G", 2), socks("JP 01", 3)];
        let out = filter(input.clone(), Some("剩余|过期")).unwrap();
        assert_eq!(names(&out), vec!["HK 01", "JP 01"]);

        assert_eq!(filter(input.clone(), Some("  ")).unwrap().len(), 3);
        assert_eq!(filter(input, None).unwrap().len(), 3);
    }

    #[test]
    fn invalid_patterns_report_their_parameter() {
        let err = filter(vec![socks("a", 1)], Some("(")).unwrap_err();
        assert!(matches!(err, SubError::InvalidRegex { param: "remove", .. }));

        let bad = vec![Replacement {
            pattern: "[".into(),
            to: String::new(),
        }];
        let err = replace(&mut [socks("a", 1)], &bad).unwrap_err();
        assert!(matches!(err, SubError::InvalidRegex { param: "replace", .. }));
    }

    #[test]
    fn replacements_apply_cumulatively_in_order() {
        let mut proxies = vec![socks("香港 IPLC 01", 1), socks("日本 02", 2)];
        let rules = vec![
            Replacement {
                pattern: "香港".into(),
                to: "HK".into(),
            },
            Replacement {
                pattern: r"HK (\w+)".into(),
                to: "Hong Kong [$1]".into(),
            },
        ];
        replace(&mut proxies, &rules).unwrap();
        assert_eq!(names(&proxies), vec!["Hong Kong [IPLC] 01", "日本 02"]);
    }

    #[test]
    fn rename_appends_running_counter() {
        let mut proxies = vec![
            socks("127.0.0.1:1080", 1080),
            socks("127.0.0.1:1080", 1081),
            socks("b", 1),
            socks("127.0.0.1:1080", 1082),
            socks(" c ", 2),
        ];
        rename(&mut proxies);
        assert_eq!(
            names(&proxies),
            vec!["127.0.0.1:1080", "127.0.0.1:1080 1", "b", "127.0.0.1:1080 2", "c"]
        );
    }

    #[test]
    fn label_prefixes_trimmed_name() {
        let mut proxies = vec![socks(" JP 01 ", 1)];
        apply_label(&mut proxies, " Airport ");
        assert_eq!(proxies[0].name, "Airport JP 01");
    }
}
