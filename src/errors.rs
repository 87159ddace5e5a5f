use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflinkerError {
    Validation(String),
    NotFound(String),
    Storage(String),
    Serialization(String),
    Config(String),
    Locked(String),
}

impl ReflinkerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ReflinkerError::Validation(_) => "E001",
            ReflinkerError::NotFound(_) => "E002",
            ReflinkerError::Storage(_) => "E003",
            ReflinkerError::Serialization(_) => "E004",
            ReflinkerError::Config(_) => "E005",
            ReflinkerError::Locked(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ReflinkerError::Validation(_) => "Validation Error",
            ReflinkerError::NotFound(_) => "Resource Not Found",
            ReflinkerError::Storage(_) => "Storage Error",
            ReflinkerError::Serialization(_) => "Serialization Error",
            ReflinkerError::Config(_) => "Configuration Error",
            ReflinkerError::Locked(_) => "Resource Locked",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ReflinkerError::Validation(msg) => msg,
            ReflinkerError::NotFound(msg) => msg,
            ReflinkerError::Storage(msg) => msg,
            ReflinkerError::Serialization(msg) => msg,
            ReflinkerError::Config(msg) => msg,
            ReflinkerError::Locked(msg) => msg,
        }
    }

    /// 存储层错误（包括持久化数据损坏）
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            ReflinkerError::Storage(_) | ReflinkerError::Serialization(_)
        )
    }

    /// 映射到 HTTP 状态码
    #[cfg(feature = "server")]
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ReflinkerError::Validation(_) => StatusCode::BAD_REQUEST,
            ReflinkerError::NotFound(_) => StatusCode::NOT_FOUND,
            ReflinkerError::Storage(_)
            | ReflinkerError::Serialization(_)
            | ReflinkerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ReflinkerError::Locked(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ReflinkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ReflinkerError {}

// 便捷的构造函数
impl ReflinkerError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ReflinkerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ReflinkerError::NotFound(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        ReflinkerError::Storage(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ReflinkerError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        ReflinkerError::Config(msg.into())
    }

    pub fn locked<T: Into<String>>(msg: T) -> Self {
        ReflinkerError::Locked(msg.into())
    }
}

impl From<std::io::Error> for ReflinkerError {
    fn from(err: std::io::Error) -> Self {
        ReflinkerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ReflinkerError {
    fn from(err: serde_json::Error) -> Self {
        ReflinkerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReflinkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            ReflinkerError::validation("a"),
            ReflinkerError::not_found("b"),
            ReflinkerError::storage("c"),
            ReflinkerError::serialization("d"),
            ReflinkerError::config("e"),
            ReflinkerError::locked("f"),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_format_simple() {
        let err = ReflinkerError::not_found("no destination for abc");
        assert_eq!(
            err.format_simple(),
            "Resource Not Found: no destination for abc"
        );
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_http_status_mapping() {
        use actix_web::http::StatusCode;
        assert_eq!(
            ReflinkerError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReflinkerError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ReflinkerError::storage("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReflinkerError = io.into();
        assert!(matches!(err, ReflinkerError::Storage(_)));
        assert!(err.is_storage_failure());
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let json_err = serde_json::from_str::<u64>("not json").unwrap_err();
        let err: ReflinkerError = json_err.into();
        assert!(matches!(err, ReflinkerError::Serialization(_)));
        assert!(err.is_storage_failure());
        assert!(!ReflinkerError::validation("x").is_storage_failure());
    }
}
