use chrono::{DateTime, SecondsFormat, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 线路格式的当前时间：毫秒精度的 RFC 3339 UTC 字符串，
    /// 与浏览器端 `toISOString()` 产生的形状一致。
    fn now_wire(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_matches_to_iso_string() {
        let clock = SystemClock;
        let wire = clock.now_wire();
        // 形如 2025-01-01T00:00:00.000Z
        assert!(wire.ends_with('Z'));
        assert_eq!(wire.len(), 24);
    }
}
