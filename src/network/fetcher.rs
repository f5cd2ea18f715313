//! HTTP 订阅获取器 (HTTP Fetcher)
//!
//! `SourceLoader` 的默认实现：缓存优先，失败重试，限制响应体大小。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use tracing::{debug, warn};

use crate::core::config::AppConfig;
use crate::core::error::{Result, SubError};
use crate::interfaces::{FetchOptions, SourceLoader};
use crate::network::cache::SubscriptionCache;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub struct HttpFetcher {
    client: reqwest::Client,
    cache: SubscriptionCache,
    config: Arc<AppConfig>,
}

impl HttpFetcher {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Arc<AppConfig>, client: reqwest::Client) -> Self {
        let cache = SubscriptionCache::new(&config.cache_path, Duration::from_secs(config.cache_expire));
        Self { client, cache, config }
    }

    /// 带重试的下载
    async fn download(&self, url: &str, user_agent: &str) -> Result<Vec<u8>> {
        let attempts = self.config.request_retry_times.max(1);
        let mut last_err = SubError::Custom(format!("no attempt made for {url}"));

        for attempt in 1..=attempts {
            match self.download_once(url, user_agent).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("获取 {} 失败 (第 {}/{} 次): {}", url, attempt, attempts, e);
                    last_err = e;
                }
            }
            if attempt < attempts {
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
        }
        Err(last_err)
    }

    async fn download_once(&self, url: &str, user_agent: &str) -> Result<Vec<u8>> {
        let limit = self.config.request_max_file_size;
        let mut resp = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?
            .error_for_status()?;

        if resp.content_length().is_some_and(|len| len > limit) {
            return Err(oversized(limit));
        }
        // 无 Content-Length 时边读边计数
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(oversized(limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn oversized(limit: u64) -> SubError {
    SubError::Custom(format!("response body exceeds {limit} bytes"))
}

#[async_trait]
impl SourceLoader for HttpFetcher {
    async fn fetch(&self, url: &str, opts: &FetchOptions) -> Result<Vec<u8>> {
        if !opts.refresh
            && let Some(body) = self.cache.get(url)
        {
            debug!("命中缓存: {}", url);
            return Ok(body);
        }

        let body = self.download(url, &opts.user_agent).await?;
        if let Err(e) = self.cache.put(url, &body) {
            warn!("写入缓存失败 {}: {}", url, e);
        }
        Ok(body)
    }

    async fn read_template(&self, path: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }
}
