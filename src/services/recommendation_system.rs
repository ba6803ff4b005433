use crate::models::assessment::{RiskAssessment, RiskLabel};
use crate::models::behavior::BehavioralData;
use crate::models::recommendation::{Recommendation, RiskLevel};

/// Scores strictly above this are Critical.
pub const CRITICAL_SCORE_THRESHOLD: f64 = 0.85;
/// Scores strictly above this (and not Critical) are High.
pub const HIGH_SCORE_THRESHOLD: f64 = 0.70;
/// Work hours strictly above this are cited in non-Low suggestions.
pub const LONG_HOURS_THRESHOLD: f64 = 10.0;

/// Ordered rules, first match wins. `label == 0` short-circuits to Low.
const RISK_RULES: [(fn(f64) -> bool, RiskLevel); 3] = [
    (|score| score > CRITICAL_SCORE_THRESHOLD, RiskLevel::Critical),
    (|score| score > HIGH_SCORE_THRESHOLD, RiskLevel::High),
    (|_| true, RiskLevel::Medium),
];

/// Maps a risk assessment to a templated recommendation. Pure, no I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecommendationSystem;

impl RecommendationSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn risk_level(label: RiskLabel, score: f64) -> RiskLevel {
        if label == RiskLabel::NotAtRisk {
            return RiskLevel::Low;
        }

        RISK_RULES
            .iter()
            .find(|(matches, _)| matches(score))
            .map(|(_, level)| *level)
            .unwrap_or(RiskLevel::Medium)
    }

    pub fn generate(
        &self,
        assessment: &RiskAssessment,
        behavioral: &BehavioralData,
    ) -> Recommendation {
        let risk_level = Self::risk_level(assessment.label, assessment.score);

        if risk_level == RiskLevel::Low {
            return Recommendation {
                risk_level,
                message: "Current work patterns appear healthy.".to_string(),
                suggestion: format!(
                    "Keep up the great work! Your current risk score is low ({}). Continue prioritizing a healthy work-life balance.",
                    format_score(assessment.score)
                ),
            };
        }

        let (message, mut suggestion) = match risk_level {
            RiskLevel::Critical => (
                "Immediate attention is strongly recommended.",
                "Consider speaking with a manager or HR about workload. It is highly advised to take some time off to disconnect and recharge.".to_string(),
            ),
            RiskLevel::High => (
                "A high risk of burnout has been detected.",
                "Actively schedule 'no-meeting' blocks in your calendar and ensure you are taking your full breaks. Try to disconnect completely after work.".to_string(),
            ),
            _ => (
                "Early warning signs of potential burnout detected.",
                "Review your daily schedule. Small changes like a 10-minute walk or a short mindfulness exercise can make a big difference.".to_string(),
            ),
        };

        if behavioral.avg_work_hours_per_day > LONG_HOURS_THRESHOLD {
            suggestion.push_str(&format!(
                " Your average of {:.1} work hours/day is a major contributing factor.",
                behavioral.avg_work_hours_per_day
            ));
        }

        Recommendation {
            risk_level,
            message: message.to_string(),
            suggestion,
        }
    }
}

/// Shortest round-trip form, keeping one decimal for whole numbers (`0.0`, not `0`).
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    }
}
