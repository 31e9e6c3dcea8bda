use chrono::{DateTime, Utc};

/// Short relative label for an activity timestamp: "Just now", "5m ago",
/// "3h ago", "2d ago". Timestamps in the future count as "Just now".
pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();

    match minutes {
        m if m < 1 => "Just now".to_string(),
        m if m < 60 => format!("{}m ago", m),
        m if m < 1440 => format!("{}h ago", m / 60),
        m => format!("{}d ago", m / 1440),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn buckets() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::seconds(30), now), "Just now");
        assert_eq!(format_time_ago(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(format_time_ago(now - Duration::minutes(150), now), "2h ago");
        assert_eq!(format_time_ago(now - Duration::days(3), now), "3d ago");
        assert_eq!(format_time_ago(now + Duration::minutes(5), now), "Just now");
    }
}
