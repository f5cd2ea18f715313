//! 订阅组装器 (Subscription Assembler)
//!
//! 负责协调单次构建请求：模板与订阅源加载 -> 解码 -> 去重/过滤/改名 -> 分组 -> 合并 -> 规则拼接。
//! 任一环节失败即终止，不返回部分结果。

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::config::AppConfig;
use crate::core::error::{Result, SubError};
use crate::decoders::DecoderRegistry;
use crate::decoders::common::query_unescape;
use crate::interfaces::{DecodeConfig, FetchOptions, SourceLoader};
use crate::model::{BuildRequest, ClashFlavor, NodeList, Proxy, ProxyType, Subscription};
use crate::utils::decode_base64;

use super::grouping::{GroupOptions, auto_group, sort_groups};
use super::{merge, passes, rules};

/// 订阅组装器
pub struct SubscriptionAssembler {
    registry: Arc<DecoderRegistry>,
    loader: Arc<dyn SourceLoader>,
    config: Arc<AppConfig>,
}

/// 拆分订阅地址末尾的 `#标签`
fn split_label(source: &str) -> (&str, Option<&str>) {
    match source.rsplit_once('#') {
        Some((url, label)) if !label.trim().is_empty() => (url, Some(label)),
        Some((url, _)) => (url, None),
        None => (source, None),
    }
}

impl SubscriptionAssembler {
    pub fn new(registry: Arc<DecoderRegistry>, loader: Arc<dyn SourceLoader>, config: Arc<AppConfig>) -> Self {
        Self {
            registry,
            loader,
            config,
        }
    }

    /// 执行构建流程
    pub async fn build(&self, flavor: ClashFlavor, req: &BuildRequest) -> Result<Subscription> {
        let fetch = FetchOptions {
            refresh: req.refresh,
            user_agent: req
                .user_agent
                .clone()
                .unwrap_or_else(|| self.config.user_agent.clone()),
        };
        let decode = DecodeConfig { use_udp: req.use_udp };

        // 1. 模板 (Template)
        let mut template = self.load_template(flavor, req, &fetch).await?;

        // 2. 订阅源与内联链接 (Sources)
        let mut proxies = Vec::new();
        for source in &req.subs {
            let loaded = self.load_source(source, &fetch, &decode).await?;
            debug!("订阅源 {} 解析出 {} 个节点", source, loaded.len());
            proxies.extend(loaded);
        }
        proxies.extend(self.registry.decode_all(&decode, &req.proxies)?);

        // 3. 节点处理 (Passes)
        let mut proxies = passes::dedup(proxies)?;
        proxies = passes::filter(proxies, req.remove.as_deref())?;
        passes::replace(&mut proxies, &req.replacements)?;
        passes::rename(&mut proxies);

        // 4. 分组与合并 (Group & Merge)
        let supported = self.registry.supported_types(flavor);
        let opts = GroupOptions {
            auto_test: req.auto_test,
            lazy: req.lazy,
        };
        let mut generated = auto_group(proxies, &supported, opts);
        sort_groups(&mut generated.proxy_groups, req.sort);
        info!(
            "共生成 {} 个节点, {} 个地区分组",
            generated.proxies.len(),
            generated.proxy_groups.len()
        );
        merge::merge(&mut template, generated, req.ignore_country_group);

        // 5. 规则拼接 (Rules)
        rules::splice_rules(&mut template, &req.rules);
        rules::splice_rule_providers(&mut template, &req.rule_providers);

        Ok(template)
    }

    /// 构建并序列化，节点列表模式仅输出 `proxies`
    pub async fn render(&self, flavor: ClashFlavor, req: &BuildRequest) -> Result<String> {
        let sub = self.build(flavor, req).await?;
        if req.node_list {
            NodeList::from(sub).to_yaml()
        } else {
            sub.to_yaml()
        }
    }

    async fn load_template(&self, flavor: ClashFlavor, req: &BuildRequest, fetch: &FetchOptions) -> Result<Subscription> {
        let reference = req
            .template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.config.default_template(flavor));

        let bytes = if reference.starts_with("http") {
            self.loader.fetch(reference, fetch).await
        } else {
            let unescaped = query_unescape(reference);
            let target = self.config.resolve_template_alias(&unescaped).to_string();
            if target.starts_with("http") {
                self.loader.fetch(&target, fetch).await
            } else {
                self.loader.read_template(&target).await
            }
        }
        .map_err(|e| SubError::load_failed(reference, e))?;

        let content = String::from_utf8_lossy(&bytes);
        Subscription::from_yaml(&content).map_err(|e| SubError::parse_failed(reference, e))
    }

    async fn load_source(&self, source: &str, fetch: &FetchOptions, decode: &DecodeConfig) -> Result<Vec<Proxy>> {
        let (url, label) = split_label(source);
        let bytes = self
            .loader
            .fetch(url, fetch)
            .await
            .map_err(|e| SubError::load_failed(source, e))?;

        let mut proxies = self.parse_source(source, &String::from_utf8_lossy(&bytes), decode)?;
        if let Some(label) = label {
            passes::apply_label(&mut proxies, label);
        }
        Ok(proxies)
    }

    /// 识别订阅内容：结构化 YAML、明文链接列表或 Base64 包裹的链接列表
    fn parse_source(&self, location: &str, content: &str, decode: &DecodeConfig) -> Result<Vec<Proxy>> {
        if let Ok(serde_yml::Value::Mapping(doc)) = serde_yml::from_str::<serde_yml::Value>(content) {
            return Self::structured_proxies(location, doc);
        }

        let prefixes = self.registry.prefixes();
        if prefixes.iter().any(|p| content.contains(p)) {
            return Ok(self.registry.decode_all(decode, content.lines())?);
        }

        let decoded = decode_base64(content).map_err(|e| SubError::parse_failed(location, e))?;
        Ok(self.registry.decode_all(decode, decoded.lines())?)
    }

    /// 从结构化文档的 `proxies` 列表中提取节点，未知协议类型跳过
    fn structured_proxies(location: &str, mut doc: serde_yml::Mapping) -> Result<Vec<Proxy>> {
        let Some(serde_yml::Value::Sequence(entries)) = doc.remove("proxies") else {
            return Ok(Vec::new());
        };

        let mut proxies = Vec::with_capacity(entries.len());
        for entry in entries {
            let kind = entry.get("type").and_then(|t| t.as_str()).unwrap_or_default();
            if ProxyType::from_str(kind).is_err() {
                warn!("跳过不支持的节点类型 `{}` ({})", kind, location);
                continue;
            }
            let proxy: Proxy = serde_yml::from_value(entry).map_err(|e| SubError::parse_failed(location, e))?;
            proxies.push(proxy);
        }
        Ok(proxies)
    }
}
