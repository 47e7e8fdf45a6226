use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Requests older than this are hidden from the public board.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub requester_id: String,
    pub requester_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    pub fn is_recent(&self, now: DateTime<Utc>) -> bool {
        if let Some(expires_at) = self.expires_at {
            if expires_at <= now {
                return false;
            }
        }
        self.created_at > now - Duration::days(RECENT_WINDOW_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(created_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> ServiceRequest {
        ServiceRequest {
            id: "r1".into(),
            title: "Need a plumber".into(),
            description: "Leaking kitchen sink".into(),
            requester_id: "u1".into(),
            requester_name: "Okello".into(),
            created_at,
            expires_at,
        }
    }

    #[test]
    fn seven_day_window() {
        let now = Utc::now();
        assert!(request(now - Duration::days(6), None).is_recent(now));
        assert!(!request(now - Duration::days(8), None).is_recent(now));
    }

    #[test]
    fn expiry_hides_request() {
        let now = Utc::now();
        assert!(!request(now - Duration::days(1), Some(now - Duration::hours(1))).is_recent(now));
        assert!(request(now - Duration::days(1), Some(now + Duration::hours(1))).is_recent(now));
    }
}
