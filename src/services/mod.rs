pub mod assessment_service;
pub mod behavioral_tracker;
pub mod emotion_analyzer;
pub mod feature_assembler;
pub mod prediction_engine;
pub mod recommendation_system;
pub mod tracking_service;
