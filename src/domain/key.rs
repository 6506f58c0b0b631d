//! 稳定 key 与媒体 URL 分类

use super::model::FeedItem;

/// 派生条目的稳定身份：优先 id，其次原始 mediaUrl，否则空串。
///
/// 缓存记账一律以此为单位，与条目在列表中的位置无关。
pub fn stable_key(item: &FeedItem) -> String {
    if let Some(id) = item.id.as_ref() {
        return id.to_string();
    }
    item.media_url.clone().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `.m3u8` 清单
    Hls,
    /// 渐进式 `.mp4` 文件
    Mp4,
    Unknown,
}

impl MediaKind {
    pub fn of(url: &str) -> Self {
        if is_hls(url) {
            MediaKind::Hls
        } else if is_mp4(url) {
            MediaKind::Mp4
        } else {
            MediaKind::Unknown
        }
    }
}

pub fn is_hls(url: &str) -> bool {
    has_extension(url, ".m3u8")
}

pub fn is_mp4(url: &str) -> bool {
    has_extension(url, ".mp4")
}

/// URL 路径部分（去掉 `?query`）。
pub(crate) fn strip_query(url: &str) -> &str {
    match url.split_once('?') {
        Some((path, _)) => path,
        None => url,
    }
}

// `<ext>` 位于末尾，或紧跟一个 query string；大小写不敏感。
pub(crate) fn has_extension(url: &str, ext: &str) -> bool {
    let path = strip_query(url);
    path.len() >= ext.len()
        && path
            .get(path.len() - ext.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemId;

    #[test]
    fn test_stable_key_prefers_id() {
        let item = FeedItem::new(12, "https://cdn.example.com/a.mp4");
        assert_eq!(stable_key(&item), "12");
    }

    #[test]
    fn test_stable_key_falls_back_to_url() {
        let item = FeedItem {
            id: None,
            media_url: Some("https://cdn.example.com/a.mp4".to_owned()),
            thumbnail_url: None,
        };
        assert_eq!(stable_key(&item), "https://cdn.example.com/a.mp4");
        assert_eq!(stable_key(&FeedItem::default()), "");
    }

    #[test]
    fn test_stable_key_is_position_independent() {
        let a = FeedItem::new(ItemId::Text("reel-a".to_owned()), "https://x/a.mp4");
        let feed1 = [FeedItem::default(), a.clone()];
        let feed2 = [a.clone(), FeedItem::default(), FeedItem::default()];
        assert_eq!(stable_key(&feed1[1]), stable_key(&feed2[0]));
    }

    #[test]
    fn test_is_hls() {
        assert!(is_hls("https://cdn.example.com/v/master.m3u8"));
        assert!(is_hls("https://cdn.example.com/v/master.M3U8?token=abc"));
        assert!(!is_hls("https://cdn.example.com/v/master.m3u8.bak"));
        assert!(!is_hls("https://cdn.example.com/v/clip.mp4"));
    }

    #[test]
    fn test_is_mp4() {
        assert!(is_mp4("https://cdn.example.com/clip.mp4"));
        assert!(is_mp4("https://cdn.example.com/clip.MP4?sig=1&exp=2"));
        assert!(!is_mp4("https://cdn.example.com/clip.mp4v"));
        assert!(!is_mp4("https://cdn.example.com/clip.mov"));
    }

    #[test]
    fn test_media_kind_unknown() {
        assert_eq!(MediaKind::of("https://example.com/video.mov"), MediaKind::Unknown);
        assert_eq!(MediaKind::of("https://example.com/a.m3u8"), MediaKind::Hls);
        assert_eq!(MediaKind::of("https://example.com/a.mp4"), MediaKind::Mp4);
    }
}
