//! Lifecycle status classification
//!
//! Status is relative to the trend set produced by the run, not absolute:
//! "hot" for a quiet workspace is different from "hot" for a busy one. With
//! enough trends the thresholds adapt to the set's own score and velocity
//! distribution; small sets fall back to fixed thresholds.

use statrs::statistics::{Data, OrderStatistics};
use tracing::debug;

use crate::models::{Trend, TrendStatus};

/// Trend count at which percentile-based thresholds kick in
pub const ADAPTIVE_MIN_TRENDS: usize = 10;

/// Usable samples required per distribution for percentiles to be meaningful
const MIN_PERCENTILE_SAMPLES: usize = 3;

/// Classification thresholds, fixed or adapted to the population
#[derive(Debug, Clone, PartialEq)]
pub struct StatusThresholds {
    pub rising_velocity: f64,
    pub hot_score: f64,
    pub peak_score: f64,
    pub peak_velocity_max: f64,
    pub declining_score: f64,
}

impl StatusThresholds {
    /// Fixed fallback thresholds for small trend sets
    pub fn fixed() -> Self {
        Self {
            rising_velocity: 0.5,
            hot_score: 0.75,
            peak_score: 0.90,
            peak_velocity_max: 0.2,
            declining_score: 0.4,
        }
    }

    /// Percentile thresholds from the population's own distribution
    ///
    /// Returns None when either distribution has fewer than three finite
    /// samples, in which case the caller falls back to [`Self::fixed`].
    pub fn adaptive(trends: &[Trend]) -> Option<Self> {
        let velocities: Vec<f64> = trends
            .iter()
            .map(|t| t.velocity)
            .filter(|v| v.is_finite())
            .collect();
        let scores: Vec<f64> = trends
            .iter()
            .map(|t| t.strength_score)
            .filter(|s| s.is_finite())
            .collect();

        if velocities.len() < MIN_PERCENTILE_SAMPLES || scores.len() < MIN_PERCENTILE_SAMPLES {
            return None;
        }

        let mut velocities = Data::new(velocities);
        let mut scores = Data::new(scores);
        Some(Self {
            rising_velocity: velocities.percentile(75),
            hot_score: scores.percentile(75),
            peak_score: scores.percentile(90),
            peak_velocity_max: velocities.percentile(25),
            declining_score: scores.percentile(25),
        })
    }

    /// Pick adaptive thresholds for large sets, fixed otherwise
    pub fn for_population(trends: &[Trend]) -> Self {
        if trends.len() >= ADAPTIVE_MIN_TRENDS {
            if let Some(thresholds) = Self::adaptive(trends) {
                debug!(?thresholds, "Using adaptive status thresholds");
                return thresholds;
            }
        }
        Self::fixed()
    }
}

/// Classify one trend; precedence order is fixed, first match wins
pub fn classify(score: f64, velocity: f64, thresholds: &StatusThresholds) -> TrendStatus {
    if score >= thresholds.peak_score && velocity < thresholds.peak_velocity_max {
        // saturated and no longer growing
        TrendStatus::Peak
    } else if score >= thresholds.hot_score {
        TrendStatus::Hot
    } else if velocity >= thresholds.rising_velocity {
        TrendStatus::Rising
    } else if score < thresholds.declining_score {
        TrendStatus::Declining
    } else {
        TrendStatus::Emerging
    }
}

/// Assign statuses across the whole run's trend set
pub fn assign_statuses(trends: &mut [Trend]) {
    let thresholds = StatusThresholds::for_population(trends);
    for trend in trends.iter_mut() {
        trend.status = classify(trend.strength_score, trend.velocity, &thresholds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidenceLevel;
    use chrono::Utc;
    use uuid::Uuid;

    fn trend(score: f64, velocity: f64) -> Trend {
        let now = Utc::now();
        Trend {
            workspace_id: Uuid::nil(),
            topic: format!("s{score}v{velocity}"),
            keywords: vec![],
            strength_score: score,
            mention_count: 0,
            velocity,
            sources: vec![],
            source_count: 0,
            key_content_ids: vec![],
            first_seen: now,
            peak_time: now,
            explanation: String::new(),
            related_topics: vec![],
            confidence: ConfidenceLevel::Low,
            is_active: true,
            status: TrendStatus::Emerging,
            detected_at: now,
        }
    }

    #[test]
    fn test_fixed_precedence_order() {
        let t = StatusThresholds::fixed();
        // peak: saturated score, flat velocity
        assert_eq!(classify(0.95, 0.1, &t), TrendStatus::Peak);
        // high score but still growing: hot, not peak
        assert_eq!(classify(0.95, 80.0, &t), TrendStatus::Hot);
        assert_eq!(classify(0.8, 0.1, &t), TrendStatus::Hot);
        // moderate score, growing
        assert_eq!(classify(0.5, 60.0, &t), TrendStatus::Rising);
        // weak and flat
        assert_eq!(classify(0.3, 0.1, &t), TrendStatus::Declining);
        // middling everything
        assert_eq!(classify(0.5, 0.1, &t), TrendStatus::Emerging);
    }

    #[test]
    fn test_adaptive_needs_three_samples() {
        let trends = vec![trend(0.5, 10.0), trend(0.6, 20.0)];
        assert!(StatusThresholds::adaptive(&trends).is_none());
    }

    #[test]
    fn test_strategy_switches_at_ten_trends() {
        // Nine trends: fixed thresholds even though percentiles are computable.
        let nine: Vec<Trend> = (0..9).map(|i| trend(0.1 * i as f64, 10.0 * i as f64)).collect();
        assert_eq!(StatusThresholds::for_population(&nine), StatusThresholds::fixed());

        // Ten trends: adaptive thresholds differ from fixed for this population.
        let ten: Vec<Trend> = (0..10).map(|i| trend(0.1 * i as f64, 10.0 * i as f64)).collect();
        let thresholds = StatusThresholds::for_population(&ten);
        assert_ne!(thresholds, StatusThresholds::fixed());
        assert!(thresholds.hot_score > thresholds.declining_score);
        assert!(thresholds.rising_velocity > thresholds.peak_velocity_max);
    }

    #[test]
    fn test_assign_statuses_small_set_uses_fixed() {
        let mut trends = vec![trend(0.95, 0.0), trend(0.5, 80.0), trend(0.1, 0.0)];
        assign_statuses(&mut trends);
        assert_eq!(trends[0].status, TrendStatus::Peak);
        assert_eq!(trends[1].status, TrendStatus::Rising);
        assert_eq!(trends[2].status, TrendStatus::Declining);
    }

    #[test]
    fn test_adaptive_population_relative() {
        // A uniformly strong population: the top slice is hot/peak, the
        // bottom slice declining, relative to peers rather than absolutes.
        let mut trends: Vec<Trend> = (0..12)
            .map(|i| trend(0.80 + 0.01 * i as f64, 5.0 + i as f64))
            .collect();
        assign_statuses(&mut trends);
        // weakest of a strong population is below its 25th percentile
        assert_eq!(trends[0].status, TrendStatus::Declining);
        // strongest is at/above the 90th percentile with flat velocity only
        // if velocity < p25; here velocity grows with score, so hot
        assert_eq!(trends[11].status, TrendStatus::Hot);
    }
}
