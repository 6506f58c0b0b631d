use serde::{Deserialize, Serialize};
use std::fmt;

/// 信息流条目 ID：后端可能下发数字或字符串。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Num(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Num(v) => write!(f, "{v}"),
            ItemId::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ItemId {
    fn from(v: i64) -> Self {
        ItemId::Num(v)
    }
}

impl From<i32> for ItemId {
    fn from(v: i32) -> Self {
        ItemId::Num(i64::from(v))
    }
}

impl From<&str> for ItemId {
    fn from(v: &str) -> Self {
        ItemId::Text(v.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(v: String) -> Self {
        ItemId::Text(v)
    }
}
