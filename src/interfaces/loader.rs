//! 订阅源加载接口
//!
//! 组装引擎只依赖此 Trait，网络与缓存细节由实现方负责。

use async_trait::async_trait;

use crate::core::error::Result;

/// 单次获取参数
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// 跳过缓存读取，强制回源
    pub refresh: bool,
    pub user_agent: String,
}

/// 订阅源加载器 Trait
#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// 获取远程订阅或模板内容
    async fn fetch(&self, url: &str, opts: &FetchOptions) -> Result<Vec<u8>>;

    /// 读取本地模板文件
    async fn read_template(&self, path: &str) -> Result<Vec<u8>>;
}
