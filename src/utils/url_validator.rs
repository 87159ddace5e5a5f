//! 目标 URL 校验
//!
//! 目标地址最终会原样写入 `Location` 头，入库前必须保证可以作为头部值。

use url::Url;

/// URL 校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    ControlCharacter,
    InvalidProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::ControlCharacter => write!(f, "URL must not contain control characters"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 校验目标 URL
///
/// 1. 非空
/// 2. 不含控制字符（`Url::parse` 会静默去掉换行和制表符，所以先查原串）
/// 3. 协议为 http 或 https
/// 4. 能被解析
pub fn validate_url(url: &str) -> Result<(), UrlValidationError> {
    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    if url.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacter);
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }
}
