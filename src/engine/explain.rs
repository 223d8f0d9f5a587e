//! Short natural-language rationales for detected trends
//!
//! One deterministic sentence per trend, naming the evidence that put it on
//! the list: mention volume, source spread, velocity direction, and
//! lifecycle status. Suitable for surfacing in a newsletter or dashboard.

use crate::models::{Trend, TrendStatus};

/// Build the explanation sentence for a trend
pub fn build_explanation(trend: &Trend, days_back: u32) -> String {
    let mentions = format!(
        "{} mention{}",
        trend.mention_count,
        if trend.mention_count == 1 { "" } else { "s" }
    );
    let sources = format!(
        "{} source{}",
        trend.source_count,
        if trend.source_count == 1 { "" } else { "s" }
    );

    let movement = if trend.velocity >= 100.0 {
        format!("up {:.0}% vs. the prior baseline", trend.velocity)
    } else if trend.velocity > 0.0 {
        format!("up {:.0}% over the baseline window", trend.velocity)
    } else if trend.velocity < 0.0 {
        format!("down {:.0}% from the baseline window", trend.velocity.abs())
    } else {
        "flat against the baseline window".to_string()
    };

    let trajectory = match trend.status {
        TrendStatus::Emerging => "an emerging topic to watch",
        TrendStatus::Rising => "rising quickly",
        TrendStatus::Hot => "one of the strongest topics right now",
        TrendStatus::Peak => "at peak attention",
        TrendStatus::Declining => "losing momentum",
    };

    format!(
        "\"{}\" drew {} across {} in the last {} day{}, {}; {}.",
        trend.topic,
        mentions,
        sources,
        days_back,
        if days_back == 1 { "" } else { "s" },
        movement,
        trajectory
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidenceLevel;
    use chrono::Utc;
    use uuid::Uuid;

    fn trend(mentions: u64, sources: usize, velocity: f64, status: TrendStatus) -> Trend {
        let now = Utc::now();
        Trend {
            workspace_id: Uuid::nil(),
            topic: "ChatGPT Atlas".to_string(),
            keywords: vec![],
            strength_score: 0.8,
            mention_count: mentions,
            velocity,
            sources: vec![],
            source_count: sources,
            key_content_ids: vec![],
            first_seen: now,
            peak_time: now,
            explanation: String::new(),
            related_topics: vec![],
            confidence: ConfidenceLevel::High,
            is_active: true,
            status,
            detected_at: now,
        }
    }

    #[test]
    fn test_rising_trend_sentence() {
        let text = build_explanation(&trend(12, 3, 140.0, TrendStatus::Rising), 7);
        assert!(text.contains("\"ChatGPT Atlas\""));
        assert!(text.contains("12 mentions"));
        assert!(text.contains("3 sources"));
        assert!(text.contains("up 140%"));
        assert!(text.contains("rising quickly"));
        assert!(text.contains("7 days"));
    }

    #[test]
    fn test_declining_trend_sentence() {
        let text = build_explanation(&trend(4, 2, -50.0, TrendStatus::Declining), 14);
        assert!(text.contains("down 50%"));
        assert!(text.contains("losing momentum"));
    }

    #[test]
    fn test_singular_forms() {
        let text = build_explanation(&trend(1, 2, 0.0, TrendStatus::Emerging), 1);
        assert!(text.contains("1 mention "));
        assert!(text.contains("1 day,"));
        assert!(text.contains("flat against"));
    }

    #[test]
    fn test_deterministic() {
        let t = trend(12, 3, 140.0, TrendStatus::Hot);
        assert_eq!(build_explanation(&t, 7), build_explanation(&t, 7));
    }
}
