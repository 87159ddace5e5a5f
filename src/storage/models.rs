use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 目标地址的保留 key
pub const DESTINATION_KEY: &str = "meta:destination_url";

/// 来源计数的 key 前缀
pub const REFERRAL_PREFIX: &str = "ref:";

/// 记录 key
///
/// 目标地址和来源计数分属两个互不相交的命名空间，
/// 因此来源名即使叫 `destination_url` 也不会和目标地址冲突。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKey {
    Destination,
    Referral(String),
}

impl RecordKey {
    pub fn referral<T: Into<String>>(referrer: T) -> Self {
        RecordKey::Referral(referrer.into())
    }

    /// 持久化时使用的字符串形式
    pub fn storage_key(&self) -> String {
        match self {
            RecordKey::Destination => DESTINATION_KEY.to_string(),
            RecordKey::Referral(referrer) => format!("{}{}", REFERRAL_PREFIX, referrer),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if raw == DESTINATION_KEY {
            Some(RecordKey::Destination)
        } else {
            raw.strip_prefix(REFERRAL_PREFIX)
                .map(|referrer| RecordKey::Referral(referrer.to_string()))
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

impl Serialize for RecordKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.storage_key())
    }
}

impl<'de> Deserialize<'de> for RecordKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RecordKey::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown record key: {}", raw)))
    }
}

/// 记录值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Count(u64),
    Text(String),
}

impl RecordValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(text) => Some(text),
            RecordValue::Count(_) => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            RecordValue::Count(count) => Some(*count),
            RecordValue::Text(_) => None,
        }
    }
}
