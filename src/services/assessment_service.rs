use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::db::repositories::assessment_repository::AssessmentRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::assessment::{AssessmentInsert, AssessmentReport, FeatureInput, RiskAssessment};
use crate::models::behavior::{BehavioralData, ProductivityData, SentimentScore};
use crate::services::emotion_analyzer::EmotionAnalyzer;
use crate::services::feature_assembler::FeatureAssembler;
use crate::services::prediction_engine::PredictionEngine;
use crate::services::recommendation_system::RecommendationSystem;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Runs one assessment end to end: features, risk score, recommendation,
/// and an appended history row when persistence is enabled.
pub struct AssessmentService {
    db: DbPool,
    engine: Arc<PredictionEngine>,
    analyzer: Arc<EmotionAnalyzer>,
    recommender: RecommendationSystem,
    persist: bool,
}

impl AssessmentService {
    pub fn new(
        db: DbPool,
        engine: Arc<PredictionEngine>,
        analyzer: Arc<EmotionAnalyzer>,
        persist: bool,
    ) -> Self {
        Self {
            db,
            engine,
            analyzer,
            recommender: RecommendationSystem::new(),
            persist,
        }
    }

    pub fn analyzer(&self) -> Arc<EmotionAnalyzer> {
        Arc::clone(&self.analyzer)
    }

    pub fn assess(
        &self,
        behavioral: &BehavioralData,
        productivity: &ProductivityData,
        sentiment: SentimentScore,
    ) -> AppResult<AssessmentReport> {
        FeatureAssembler::validate(behavioral, productivity)?;

        let assessment = self
            .engine
            .get_burnout_risk_score(behavioral, productivity, sentiment)?;
        let recommendation = self.recommender.generate(&assessment, behavioral);

        if self.persist {
            let id = self.save_assessment(&assessment, sentiment)?;
            debug!(target: "app::assessment", id, "assessment persisted");
        }

        info!(
            target: "app::assessment",
            label = %assessment.label,
            score = assessment.score,
            level = %recommendation.risk_level,
            "assessment completed"
        );

        Ok(AssessmentReport {
            risk_label: assessment.label,
            risk_score: assessment.score,
            risk_level: recommendation.risk_level,
            message: recommendation.message,
            suggestion: recommendation.suggestion,
            sentiment_score: sentiment.value(),
        })
    }

    pub fn assess_input(&self, input: &FeatureInput) -> AppResult<AssessmentReport> {
        let (behavioral, productivity, sentiment) = FeatureAssembler::parse_input(input)?;
        self.assess(&behavioral, &productivity, sentiment)
    }

    /// Scores the free-text statement first, then runs the blocking part of
    /// the pipeline off the async executor.
    pub async fn assess_text(
        self: Arc<Self>,
        behavioral: BehavioralData,
        productivity: ProductivityData,
        text: String,
    ) -> AppResult<AssessmentReport> {
        FeatureAssembler::validate(&behavioral, &productivity)?;
        let sentiment = self.analyzer.analyze_sentiment(&text).await?;

        tokio::task::spawn_blocking(move || self.assess(&behavioral, &productivity, sentiment))
            .await
            .map_err(|err| AppError::other(format!("assessment task failed: {err}")))?
    }

    pub fn save_assessment(
        &self,
        assessment: &RiskAssessment,
        sentiment: SentimentScore,
    ) -> AppResult<i64> {
        self.save_assessment_on(Local::now().date_naive(), assessment, sentiment)
    }

    pub fn save_assessment_on(
        &self,
        date: NaiveDate,
        assessment: &RiskAssessment,
        sentiment: SentimentScore,
    ) -> AppResult<i64> {
        let insert = AssessmentInsert {
            assessment_date: date.format(DATE_FORMAT).to_string(),
            risk_label: assessment.label,
            risk_score: assessment.score,
            sentiment_score: sentiment.value(),
        };

        self.db
            .with_write_transaction(|tx| AssessmentRepository::insert(tx, &insert))
    }
}
