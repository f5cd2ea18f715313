//! 错误处理体系 (Error Handling System)
//!
//! 定义解码层与组装层的错误分类、用户可见的错误类别以及全局 Result 别名。

use thiserror::Error;

/// 分享链接解码失败原因 (Decoder Failure Kinds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum ParseErrorKind {
    /// 协议前缀无法识别
    #[strum(to_string = "invalid url prefix")]
    InvalidPrefix,
    /// URL / JSON / 主体结构损坏，或缺失主机与端口
    #[strum(to_string = "invalid struct")]
    InvalidStructure,
    /// 端口非数字或超出 1-65535
    #[strum(to_string = "invalid port number")]
    InvalidPort,
    #[strum(to_string = "invalid base64")]
    InvalidBase64,
}

/// 单条分享链接的解码错误，携带原始输入便于诊断
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message} ({raw})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub raw: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn prefix(raw: &str) -> Self {
        Self::new(ParseErrorKind::InvalidPrefix, "unsupported protocol", raw)
    }

    pub fn structure(message: impl Into<String>, raw: &str) -> Self {
        Self::new(ParseErrorKind::InvalidStructure, message, raw)
    }

    pub fn port(message: impl Into<String>, raw: &str) -> Self {
        Self::new(ParseErrorKind::InvalidPort, message, raw)
    }

    pub fn base64(message: impl Into<String>, raw: &str) -> Self {
        Self::new(ParseErrorKind::InvalidBase64, message, raw)
    }
}

/// 面向调用方的错误类别 (User-visible Classification)
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidPrefix,
    InvalidStructure,
    InvalidPort,
    InvalidBase64,
    InvalidRegex,
    SourceLoadFailed,
    SourceParseFailed,
    MarshalFailed,
    Network,
    Io,
    Config,
    Other,
}

/// 全局错误定义 (Subscription Domain Errors)
#[derive(Error, Debug)]
pub enum SubError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid regex in parameter `{param}`: {source}")]
    InvalidRegex {
        param: &'static str,
        #[source]
        source: regex::Error,
    },

    /// 模板或订阅源获取失败
    #[error("failed to load {location}: {source}")]
    SourceLoadFailed {
        location: String,
        #[source]
        source: Box<SubError>,
    },

    /// 模板或订阅源内容无法识别
    #[error("failed to parse {location}: {reason}")]
    SourceParseFailed { location: String, reason: String },

    #[error("marshal failed: {0}")]
    MarshalFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Custom(String),
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, SubError>;

impl SubError {
    pub fn load_failed(location: impl Into<String>, source: SubError) -> Self {
        SubError::SourceLoadFailed {
            location: location.into(),
            source: Box::new(source),
        }
    }

    pub fn parse_failed(location: impl Into<String>, reason: impl ToString) -> Self {
        SubError::SourceParseFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// 提取用户可见的错误类别
    ///
    /// 加载失败按外层归类，不向调用方暴露底层网络细节。
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubError::Parse(e) => match e.kind {
                ParseErrorKind::InvalidPrefix => ErrorKind::InvalidPrefix,
                ParseErrorKind::InvalidStructure => ErrorKind::InvalidStructure,
                ParseErrorKind::InvalidPort => ErrorKind::InvalidPort,
                ParseErrorKind::InvalidBase64 => ErrorKind::InvalidBase64,
            },
            SubError::InvalidRegex { .. } => ErrorKind::InvalidRegex,
            SubError::SourceLoadFailed { .. } => ErrorKind::SourceLoadFailed,
            SubError::SourceParseFailed { .. } => ErrorKind::SourceParseFailed,
            SubError::MarshalFailed(_) => ErrorKind::MarshalFailed,
            SubError::Network(_) => ErrorKind::Network,
            SubError::Io(_) => ErrorKind::Io,
            SubError::Config(_) => ErrorKind::Config,
            SubError::Custom(_) => ErrorKind::Other,
        }
    }

    /// 若为解码错误，返回其细分原因
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            SubError::Parse(e) => Some(e.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_keep_raw_input() {
        let err = ParseError::port("out of range", "anytls://pw@host:99999");
        assert_eq!(err.kind, ParseErrorKind::InvalidPort);
        assert!(err.to_string().contains("anytls://pw@host:99999"));
        assert!(err.to_string().starts_with("invalid port number"));
    }

    #[test]
    fn load_failures_classify_by_outer_stage() {
        let inner = SubError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = SubError::load_failed("https://example.com/sub", inner);
        assert_eq!(err.kind(), ErrorKind::SourceLoadFailed);
        assert_eq!(err.kind().to_string(), "SOURCE_LOAD_FAILED");
        assert!(err.parse_kind().is_none());
    }

    #[test]
    fn custom_errors_are_not_io() {
        let err = SubError::Custom("response body exceeds 10 bytes".into());
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.kind().to_string(), "OTHER");
    }

    #[test]
    fn decoder_errors_map_to_matching_kind() {
        let err: SubError = ParseError::prefix("foo://x").into();
        assert_eq!(err.kind(), ErrorKind::InvalidPrefix);
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::InvalidPrefix));
    }
}
