//! 在线状态追踪。
//!
//! 维护当前在线身份到最近活跃时间的映射。快照不保证顺序，
//! 由消费方按需要排序。

use std::collections::HashMap;

use domain::{OnlineUser, UserId};

#[derive(Default)]
pub struct PresenceTracker {
    users: HashMap<UserId, String>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或刷新最近活跃时间。每条被接受的非撤回消息都会调用。
    pub fn upsert(&mut self, user: UserId, last_active: impl Into<String>) {
        self.users.insert(user, last_active.into());
    }

    pub fn remove(&mut self, user: &UserId) -> bool {
        self.users.remove(user).is_some()
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.users.contains_key(user)
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }

    pub fn snapshot(&self) -> Vec<OnlineUser> {
        self.users
            .iter()
            .map(|(user_id, last_active)| OnlineUser {
                user_id: user_id.clone(),
                last_active: last_active.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId::parse(name).unwrap()
    }

    #[test]
    fn upsert_refreshes_last_active() {
        let mut tracker = PresenceTracker::new();
        tracker.upsert(user("alice"), "t1");
        tracker.upsert(user("alice"), "t2");

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].last_active, "t2");
    }

    #[test]
    fn remove_reports_prior_membership() {
        let mut tracker = PresenceTracker::new();
        tracker.upsert(user("alice"), "t1");
        assert!(tracker.remove(&user("alice")));
        assert!(!tracker.remove(&user("alice")));
        assert_eq!(tracker.count(), 0);
    }
}
