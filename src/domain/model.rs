use serde::{Deserialize, Serialize};

use super::ids::ItemId;

/// 信息流中的一条可播放媒体。
///
/// 每次调用 `prefetch` 时由调用方提供；字段均可缺失，缺失时由
/// [`stable_key`](super::key::stable_key) 与 URL 分类函数显式处理。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl FeedItem {
    pub fn new(id: impl Into<ItemId>, media_url: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            media_url: Some(media_url.into()),
            thumbnail_url: None,
        }
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// 媒体 URL；空字符串视为缺失。
    pub fn media_url(&self) -> Option<&str> {
        self.media_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_item_camel_case_json() {
        let item: FeedItem = serde_json::from_str(
            r#"{"id": 7, "mediaUrl": "https://cdn.example.com/7.mp4", "thumbnailUrl": "https://cdn.example.com/7.jpg"}"#,
        )
        .expect("parse item");
        assert_eq!(item.id, Some(ItemId::Num(7)));
        assert_eq!(item.media_url(), Some("https://cdn.example.com/7.mp4"));
        assert_eq!(
            item.thumbnail_url.as_deref(),
            Some("https://cdn.example.com/7.jpg")
        );
    }

    #[test]
    fn test_feed_item_missing_fields() {
        let item: FeedItem = serde_json::from_str("{}").expect("parse item");
        assert_eq!(item, FeedItem::default());
        assert!(item.media_url().is_none());
    }

    #[test]
    fn test_empty_media_url_is_absent() {
        let item = FeedItem::new(1, "");
        assert!(item.media_url().is_none());
    }
}
