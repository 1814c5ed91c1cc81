//! 提及校验。
//!
//! 发送方声称的提及列表只是建议；投递时刻哪些提及有效由服务端裁决：
//! 只保留当前在线且不是发送者本人的身份，并去重。

use domain::UserId;

use crate::presence::PresenceTracker;

/// 过滤文本消息的提及列表，返回投递时刻有效的提及集合。
///
/// 客户端未提供列表时，退回到从正文按 `@word` 模式提取候选。
pub fn validate_mentions(
    claimed: &[UserId],
    content: &str,
    sender: &UserId,
    presence: &PresenceTracker,
) -> Vec<UserId> {
    let candidates: Vec<UserId> = if claimed.is_empty() {
        extract_mentions(content)
    } else {
        claimed.to_vec()
    };

    let mut validated = Vec::new();
    for candidate in candidates {
        if candidate == *sender {
            continue;
        }
        if !presence.contains(&candidate) {
            continue;
        }
        if validated.contains(&candidate) {
            continue;
        }
        validated.push(candidate);
    }
    validated
}

/// 按客户端使用的 `@(\w+)` 模式从正文提取候选提及。
fn extract_mentions(content: &str) -> Vec<UserId> {
    let mut candidates = Vec::new();
    let mut rest = content;
    while let Some(at) = rest.find('@') {
        let after = &rest[at + 1..];
        let end = after
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(index, _)| index)
            .unwrap_or(after.len());
        if end > 0 {
            if let Ok(user) = UserId::parse(&after[..end]) {
                candidates.push(user);
            }
            rest = &after[end..];
        } else {
            // @ 后面紧跟的不是词字符，从 @ 之后继续扫描
            rest = after;
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId::parse(name).unwrap()
    }

    fn presence_with(names: &[&str]) -> PresenceTracker {
        let mut tracker = PresenceTracker::new();
        for name in names {
            tracker.upsert(user(name), "t");
        }
        tracker
    }

    #[test]
    fn offline_mentions_are_dropped() {
        // alice 独自在线时 @bob 无效
        let presence = presence_with(&["alice"]);
        let result = validate_mentions(&[user("bob")], "@bob hi", &user("alice"), &presence);
        assert!(result.is_empty());
    }

    #[test]
    fn sender_cannot_mention_self() {
        let presence = presence_with(&["alice", "bob"]);
        let result = validate_mentions(
            &[user("alice"), user("bob")],
            "@alice @bob",
            &user("alice"),
            &presence,
        );
        assert_eq!(result, vec![user("bob")]);
    }

    #[test]
    fn duplicates_collapse_to_one() {
        let presence = presence_with(&["alice", "bob"]);
        let result = validate_mentions(
            &[user("bob"), user("bob")],
            "@bob @bob",
            &user("alice"),
            &presence,
        );
        assert_eq!(result, vec![user("bob")]);
    }

    #[test]
    fn falls_back_to_extracting_from_content() {
        let presence = presence_with(&["alice", "bob", "carol"]);
        let result = validate_mentions(&[], "hey @bob and @carol!", &user("alice"), &presence);
        assert_eq!(result, vec![user("bob"), user("carol")]);
    }

    #[test]
    fn extraction_stops_at_non_word_characters() {
        let presence = presence_with(&["alice", "bob"]);
        let result = validate_mentions(&[], "@bob, look", &user("alice"), &presence);
        assert_eq!(result, vec![user("bob")]);

        // 单独的 @ 不产生候选
        let result = validate_mentions(&[], "a @ b", &user("alice"), &presence);
        assert!(result.is_empty());
    }
}
