pub mod cache;
pub mod fetcher;

pub use cache::SubscriptionCache;
pub use fetcher::HttpFetcher;
