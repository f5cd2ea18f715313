//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 的反序列化，支持 `SUBMERGE_` 前缀环境变量覆盖与默认值回退机制。

use std::collections::HashMap;
use std::path::Path;

use bon::Builder;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::core::error::{Result, SubError};
use crate::model::ClashFlavor;

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct AppConfig {
    /// 订阅缓存目录
    #[serde(default = "default_cache_path")]
    #[builder(default = default_cache_path())]
    pub cache_path: String,

    /// 缓存有效期 (秒)
    #[serde(default = "default_cache_expire")]
    #[builder(default = default_cache_expire())]
    pub cache_expire: u64,

    #[serde(default = "default_retry_times")]
    #[builder(default = default_retry_times())]
    pub request_retry_times: u32,

    /// 单个订阅响应体上限 (字节)
    #[serde(default = "default_max_file_size")]
    #[builder(default = default_max_file_size())]
    pub request_max_file_size: u64,

    #[serde(default = "default_log_level")]
    #[builder(default = default_log_level())]
    pub log_level: String,

    /// Meta 内核默认模板
    #[serde(default = "default_meta_template")]
    #[builder(default = default_meta_template())]
    pub meta_template: String,

    /// 原版 Clash 默认模板
    #[serde(default = "default_clash_template")]
    #[builder(default = default_clash_template())]
    pub clash_template: String,

    /// 模板别名映射，值可以是本地路径或 URL
    #[serde(default)]
    #[builder(default)]
    pub templates: HashMap<String, String>,

    #[serde(default = "default_user_agent")]
    #[builder(default = default_user_agent())]
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_cache_path() -> String {
    ProjectDirs::from("", "", "submerge")
        .map(|dirs| dirs.cache_dir().join("subs").to_string_lossy().into_owned())
        .unwrap_or_else(|| "subs".to_string())
}
fn default_cache_expire() -> u64 {
    300
}
fn default_retry_times() -> u32 {
    3
}
fn default_max_file_size() -> u64 {
    1024 * 1024
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_meta_template() -> String {
    "templates/template_meta.yaml".to_string()
}
fn default_clash_template() -> String {
    "templates/template_clash.yaml".to_string()
}
fn default_user_agent() -> String {
    "clash.meta".to_string()
}

impl AppConfig {
    /// 从文件系统与环境变量中加载并解析配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config_path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix("SUBMERGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder.build().map_err(SubError::Config)?;
        settings.try_deserialize().map_err(SubError::Config)
    }

    /// 目标内核对应的默认模板
    pub fn default_template(&self, flavor: ClashFlavor) -> &str {
        match flavor {
            ClashFlavor::Meta => &self.meta_template,
            ClashFlavor::Clash => &self.clash_template,
        }
    }

    /// 解析模板别名，未命中时原样返回
    pub fn resolve_template_alias<'a>(&'a self, reference: &'a str) -> &'a str {
        self.templates
            .get(reference)
            .map(String::as_str)
            .unwrap_or(reference)
    }
}
