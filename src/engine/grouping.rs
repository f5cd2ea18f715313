//! 国家/地区自动分组 (Auto Grouping)

use crate::model::{Proxy, ProxyGroup, ProxyType, SortMode, Subscription};

use super::country::classify;

/// 分组参数
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupOptions {
    /// 生成 `url-test` 组而非 `select` 组
    pub auto_test: bool,
    pub lazy: bool,
}

/// 按国家/地区为节点建组
///
/// 目标内核不支持的协议类型既不入组，也不进入生成的节点列表。
pub fn auto_group(proxies: Vec<Proxy>, supported: &[ProxyType], opts: GroupOptions) -> Subscription {
    let mut generated = Subscription::default();

    for proxy in proxies {
        if !supported.contains(&proxy.proxy_type()) {
            continue;
        }
        let country = classify(&proxy.name);
        match generated.proxy_groups.iter_mut().find(|g| g.name == country) {
            Some(group) => group.proxies.push(proxy.name.clone()),
            None => {
                let mut group = if opts.auto_test {
                    ProxyGroup::country_url_test(country, opts.lazy)
                } else {
                    ProxyGroup::country_select(country)
                };
                group.proxies.push(proxy.name.clone());
                generated.proxy_groups.push(group);
            }
        }
        generated.proxies.push(proxy);
    }

    generated
}

/// 策略组排序 (稳定排序，相等元素保持生成顺序)
pub fn sort_groups(groups: &mut [ProxyGroup], mode: SortMode) {
    let by_name = |a: &ProxyGroup, b: &ProxyGroup| a.name.cmp(&b.name);
    let by_size = |a: &ProxyGroup, b: &ProxyGroup| a.size().cmp(&b.size());
    match mode {
        SortMode::NameAsc => groups.sort_by(by_name),
        SortMode::NameDesc => groups.sort_by(|a, b| by_name(b, a)),
        SortMode::SizeAsc => groups.sort_by(by_size),
        SortMode::SizeDesc => groups.sort_by(|a, b| by_size(b, a)),
    }
}
