//! Referrer 分类器
//!
//! 将原始 Referer URL 归类为规范来源标签。规则表按顺序匹配，
//! 顺序敏感（一个主机名可能命中多条规则，先匹配者胜出），不得调整。

use url::Url;

/// 规则表：(主机名子串列表, 标签)，按顺序匹配
const REFERRER_RULES: &[(&[&str], &str)] = &[
    (&["facebook", "fb.com"], "Facebook"),
    (&["instagram"], "Instagram"),
    (&["twitter", "x.com"], "Twitter/X"),
    (&["linkedin"], "LinkedIn"),
    (&["whatsapp"], "WhatsApp"),
    (&["telegram"], "Telegram"),
    (&["reddit"], "Reddit"),
    (&["youtube"], "YouTube"),
    (&["google"], "Google"),
    (&["bing"], "Bing"),
];

/// 将 Referer URL 归类为来源标签
///
/// - 空 referrer → "direct"
/// - 无法解析为 URL → "direct"
/// - 命中规则表 → 对应标签
/// - 未命中 → 去掉前导 "www." 后的裸主机名
pub fn classify_referrer(referrer: &str) -> String {
    if referrer.is_empty() {
        return "direct".to_string();
    }

    let Ok(parsed) = Url::parse(referrer) else {
        return "direct".to_string();
    };
    let Some(host) = parsed.host_str() else {
        return "direct".to_string();
    };

    let domain = host.strip_prefix("www.").unwrap_or(host);

    for (needles, label) in REFERRER_RULES {
        if needles.iter().any(|needle| domain.contains(needle)) {
            return label.to_string();
        }
    }

    domain.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_direct() {
        assert_eq!(classify_referrer(""), "direct");
    }

    #[test]
    fn test_unparseable_is_direct() {
        assert_eq!(classify_referrer("not a url"), "direct");
    }

    #[test]
    fn test_facebook_with_www() {
        assert_eq!(classify_referrer("https://www.facebook.com/x"), "Facebook");
    }

    #[test]
    fn test_fb_short_domain() {
        assert_eq!(classify_referrer("https://fb.com/groups/1"), "Facebook");
    }

    #[test]
    fn test_reddit_subdomain() {
        assert_eq!(classify_referrer("https://m.reddit.com/r/x"), "Reddit");
    }

    #[test]
    fn test_twitter_and_x() {
        assert_eq!(classify_referrer("https://twitter.com/user"), "Twitter/X");
        assert_eq!(classify_referrer("https://x.com/user"), "Twitter/X");
    }

    #[test]
    fn test_unmatched_returns_bare_hostname() {
        assert_eq!(classify_referrer("https://example.org"), "example.org");
        assert_eq!(
            classify_referrer("https://www.example.org/page"),
            "example.org"
        );
    }

    #[test]
    fn test_rule_order_is_preserved() {
        // 主机名同时含 "reddit" 和 "google"，reddit 规则在前，必须胜出
        assert_eq!(classify_referrer("https://redditgoogle.com/x"), "Reddit");
    }
}
