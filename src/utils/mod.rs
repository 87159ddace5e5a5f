pub mod url_validator;

pub use url_validator::{UrlValidationError, validate_url};

/// 短码最大长度
pub const MAX_SHORT_CODE_LEN: usize = 128;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    // 生成指定长度的随机字符串
    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 校验短码格式：非空、长度受限、仅含字母数字和 `-` `_` `.`
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        && code != "."
        && code != ".."
}

/// HTML 转义，用于页面中的动态文本
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code_length_and_charset() {
        let code = generate_random_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(is_valid_short_code(&code));
    }

    #[test]
    fn test_generated_codes_differ() {
        let a = generate_random_code(16);
        let b = generate_random_code(16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_valid_short_code() {
        assert!(is_valid_short_code("Ab3_x-9.z"));
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("has space"));
        assert!(!is_valid_short_code("a/b"));
        assert!(!is_valid_short_code(".."));
        assert!(!is_valid_short_code(&"a".repeat(MAX_SHORT_CODE_LEN + 1)));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
