use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::assessment::{
    FeatureVector, RiskAssessment, RiskLabel, FEATURE_COUNT, FEATURE_NAMES,
};
use crate::models::behavior::{BehavioralData, ProductivityData, SentimentScore};
use crate::services::feature_assembler::FeatureAssembler;

/// Probability above which the classifier predicts the at-risk class.
pub const DECISION_THRESHOLD: f64 = 0.5;

const SCORE_DECIMALS: f64 = 10_000.0;

/// Rounds a probability to 4 decimals, half away from zero.
pub fn round_score(probability: f64) -> f64 {
    (probability * SCORE_DECIMALS).round() / SCORE_DECIMALS
}

type Features = [f64; FEATURE_COUNT];

// ---------------------------------------------------------------------------
// Serialized artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    StandardScaler {
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMaxScaler {
        feature_names: Vec<String>,
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "unit_range")]
        feature_range: [f64; 2],
    },
}

fn unit_range() -> [f64; 2] {
    [0.0, 1.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    RandomForest {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        trees: Vec<TreeArtifact>,
    },
    SoftVoting {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        estimators: Vec<ClassifierArtifact>,
        #[serde(default)]
        weights: Option<Vec<f64>>,
    },
}

impl ClassifierArtifact {
    fn feature_names(&self) -> Option<&[String]> {
        match self {
            ClassifierArtifact::LogisticRegression { feature_names, .. }
            | ClassifierArtifact::RandomForest { feature_names, .. }
            | ClassifierArtifact::SoftVoting { feature_names, .. } => feature_names.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub nodes: Vec<TreeNode>,
}

/// Split nodes send `x[feature] <= threshold` left. Leaves carry class weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

// ---------------------------------------------------------------------------
// Scaler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureScaler {
    Standard {
        mean: Features,
        scale: Features,
    },
    MinMax {
        data_min: Features,
        data_range: Features,
        feature_range: [f64; 2],
    },
}

impl FeatureScaler {
    pub fn from_artifact(artifact: ScalerArtifact) -> AppResult<Self> {
        match artifact {
            ScalerArtifact::StandardScaler {
                feature_names,
                mean,
                scale,
            } => {
                ensure_feature_order(&feature_names, "scaler")?;
                let mean = fixed_width(mean, "scaler.mean")?;
                let mut scale = fixed_width(scale, "scaler.scale")?;
                for value in scale.iter_mut() {
                    if *value == 0.0 {
                        *value = 1.0;
                    }
                }
                Ok(FeatureScaler::Standard { mean, scale })
            }
            ScalerArtifact::MinMaxScaler {
                feature_names,
                data_min,
                data_max,
                feature_range,
            } => {
                ensure_feature_order(&feature_names, "scaler")?;
                let data_min = fixed_width(data_min, "scaler.data_min")?;
                let data_max = fixed_width(data_max, "scaler.data_max")?;
                if !feature_range.iter().all(|v| v.is_finite()) || feature_range[0] >= feature_range[1] {
                    return Err(AppError::model_load(
                        "scaler.feature_range must be an increasing pair",
                    ));
                }

                let mut data_range = [0.0; FEATURE_COUNT];
                for (index, range) in data_range.iter_mut().enumerate() {
                    let width = data_max[index] - data_min[index];
                    if width < 0.0 {
                        return Err(AppError::model_load(format!(
                            "scaler.data_max is below data_min for {}",
                            FEATURE_NAMES[index]
                        )));
                    }
                    *range = if width == 0.0 { 1.0 } else { width };
                }

                Ok(FeatureScaler::MinMax {
                    data_min,
                    data_range,
                    feature_range,
                })
            }
        }
    }

    pub fn transform(&self, features: &FeatureVector) -> Features {
        let raw = features.as_array();
        let mut scaled = [0.0; FEATURE_COUNT];
        match self {
            FeatureScaler::Standard { mean, scale } => {
                for index in 0..FEATURE_COUNT {
                    scaled[index] = (raw[index] - mean[index]) / scale[index];
                }
            }
            FeatureScaler::MinMax {
                data_min,
                data_range,
                feature_range,
            } => {
                let [low, high] = *feature_range;
                for index in 0..FEATURE_COUNT {
                    let unit = (raw[index] - data_min[index]) / data_range[index];
                    scaled[index] = unit * (high - low) + low;
                }
            }
        }
        scaled
    }
}

// ---------------------------------------------------------------------------
// Classifiers
// ---------------------------------------------------------------------------

/// A fitted binary classifier over scaled features.
pub trait Classifier: Send + Sync {
    fn kind(&self) -> &'static str;

    /// P(label = 1) for already-scaled features.
    fn predict_proba(&self, features: &Features) -> f64;
}

/// Hard label for a probability; ties at the threshold are not at risk.
pub fn label_for_probability(probability: f64) -> RiskLabel {
    if probability > DECISION_THRESHOLD {
        RiskLabel::AtRisk
    } else {
        RiskLabel::NotAtRisk
    }
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coefficients: Features,
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Features, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn predict_proba(&self, features: &Features) -> f64 {
        let logit = self
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-logit).exp())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        positive: f64,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_artifact(artifact: TreeArtifact, tree_index: usize) -> AppResult<Self> {
        if artifact.nodes.is_empty() {
            return Err(AppError::model_load(format!("tree {tree_index} has no nodes")));
        }

        let node_count = artifact.nodes.len();
        let mut nodes = Vec::with_capacity(node_count);
        for (index, node) in artifact.nodes.into_iter().enumerate() {
            let node = match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(AppError::model_load(format!(
                            "tree {tree_index} node {index} splits on unknown feature {feature}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(AppError::model_load(format!(
                            "tree {tree_index} node {index} has a non-finite threshold"
                        )));
                    }
                    // Children must come after their parent, which also rules out cycles.
                    for child in [left, right] {
                        if child <= index || child >= node_count {
                            return Err(AppError::model_load(format!(
                                "tree {tree_index} node {index} has invalid child {child}"
                            )));
                        }
                    }
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    }
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    if !value.iter().all(|v| v.is_finite() && *v >= 0.0) || total <= 0.0 {
                        return Err(AppError::model_load(format!(
                            "tree {tree_index} leaf {index} has invalid class weights"
                        )));
                    }
                    Node::Leaf {
                        positive: value[1] / total,
                    }
                }
            };
            nodes.push(node);
        }

        Ok(Self { nodes })
    }

    fn leaf_probability(&self, features: &Features) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { positive } => return *positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl Classifier for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn predict_proba(&self, features: &Features) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.leaf_probability(features))
            .sum();
        total / self.trees.len() as f64
    }
}

pub struct SoftVoting {
    members: Vec<(Box<dyn Classifier>, f64)>,
}

impl Classifier for SoftVoting {
    fn kind(&self) -> &'static str {
        "soft_voting"
    }

    fn predict_proba(&self, features: &Features) -> f64 {
        let weight_sum: f64 = self.members.iter().map(|(_, weight)| weight).sum();
        self.members
            .iter()
            .map(|(member, weight)| member.predict_proba(features) * weight)
            .sum::<f64>()
            / weight_sum
    }
}

pub fn classifier_from_artifact(artifact: ClassifierArtifact) -> AppResult<Box<dyn Classifier>> {
    if let Some(names) = artifact.feature_names() {
        ensure_feature_order(names, "classifier")?;
    }

    match artifact {
        ClassifierArtifact::LogisticRegression {
            coefficients,
            intercept,
            ..
        } => {
            let coefficients = fixed_width(coefficients, "classifier.coefficients")?;
            if !intercept.is_finite() {
                return Err(AppError::model_load("classifier.intercept must be finite"));
            }
            Ok(Box::new(LogisticRegression::new(coefficients, intercept)))
        }
        ClassifierArtifact::RandomForest { trees, .. } => {
            if trees.is_empty() {
                return Err(AppError::model_load("random forest has no trees"));
            }
            let trees = trees
                .into_iter()
                .enumerate()
                .map(|(index, tree)| DecisionTree::from_artifact(tree, index))
                .collect::<AppResult<Vec<_>>>()?;
            Ok(Box::new(RandomForest { trees }))
        }
        ClassifierArtifact::SoftVoting {
            estimators,
            weights,
            ..
        } => {
            if estimators.is_empty() {
                return Err(AppError::model_load("soft voting ensemble has no estimators"));
            }
            let weights = weights.unwrap_or_else(|| vec![1.0; estimators.len()]);
            if weights.len() != estimators.len() {
                return Err(AppError::model_load(format!(
                    "soft voting has {} estimators but {} weights",
                    estimators.len(),
                    weights.len()
                )));
            }
            if !weights.iter().all(|w| w.is_finite() && *w >= 0.0)
                || weights.iter().sum::<f64>() <= 0.0
            {
                return Err(AppError::model_load(
                    "soft voting weights must be non-negative with a positive sum",
                ));
            }

            let members = estimators
                .into_iter()
                .map(classifier_from_artifact)
                .zip(weights)
                .map(|(member, weight)| member.map(|member| (member, weight)))
                .collect::<AppResult<Vec<_>>>()?;
            Ok(Box::new(SoftVoting { members }))
        }
    }
}

fn ensure_feature_order(names: &[String], artifact: &str) -> AppResult<()> {
    let matches = names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_NAMES.iter())
            .all(|(actual, expected)| actual == expected);
    if matches {
        Ok(())
    } else {
        Err(AppError::model_load(format!(
            "{artifact} was fit on columns {names:?}, expected {FEATURE_NAMES:?}"
        )))
    }
}

fn fixed_width(values: Vec<f64>, field: &str) -> AppResult<Features> {
    if values.iter().any(|value| !value.is_finite()) {
        return Err(AppError::model_load(format!("{field} contains non-finite values")));
    }
    let len = values.len();
    values.try_into().map_err(|_| {
        AppError::model_load(format!("{field} has {len} entries, expected {FEATURE_COUNT}"))
    })
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scaler + classifier pair loaded once and shared for the process lifetime.
pub struct PredictionEngine {
    scaler: FeatureScaler,
    classifier: Box<dyn Classifier>,
}

impl PredictionEngine {
    pub fn new(scaler: FeatureScaler, classifier: Box<dyn Classifier>) -> Self {
        Self { scaler, classifier }
    }

    pub fn load(scaler_path: &Path, classifier_path: &Path) -> AppResult<Self> {
        info!(
            target: "app::model",
            scaler = %scaler_path.display(),
            classifier = %classifier_path.display(),
            "initializing prediction engine"
        );
        let scaler_json = read_artifact(scaler_path)?;
        let classifier_json = read_artifact(classifier_path)?;
        let engine = Self::from_json(&scaler_json, &classifier_json)?;
        info!(
            target: "app::model",
            classifier_kind = engine.classifier.kind(),
            "prediction engine loaded"
        );
        Ok(engine)
    }

    pub fn from_json(scaler_json: &str, classifier_json: &str) -> AppResult<Self> {
        let scaler: ScalerArtifact = serde_json::from_str(scaler_json)
            .map_err(|err| AppError::model_load(format!("malformed scaler artifact: {err}")))?;
        let classifier: ClassifierArtifact = serde_json::from_str(classifier_json)
            .map_err(|err| AppError::model_load(format!("malformed classifier artifact: {err}")))?;

        if classifier.feature_names().is_none() {
            return Err(AppError::model_load(
                "classifier artifact must declare feature_names",
            ));
        }

        Ok(Self::new(
            FeatureScaler::from_artifact(scaler)?,
            classifier_from_artifact(classifier)?,
        ))
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind()
    }

    pub fn score(&self, features: &FeatureVector) -> AppResult<RiskAssessment> {
        let scaled = self.scaler.transform(features);
        let probability = self.classifier.predict_proba(&scaled);

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(AppError::prediction(format!(
                "classifier produced an invalid probability: {probability}"
            )));
        }

        let label = label_for_probability(probability);
        let score = round_score(probability);

        debug!(target: "app::model", %label, score, "burnout risk scored");
        Ok(RiskAssessment { label, score })
    }

    pub fn get_burnout_risk_score(
        &self,
        behavioral: &BehavioralData,
        productivity: &ProductivityData,
        sentiment: SentimentScore,
    ) -> AppResult<RiskAssessment> {
        let features = FeatureAssembler::assemble(behavioral, productivity, sentiment);
        self.score(&features)
    }
}

fn read_artifact(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path)
        .map_err(|err| AppError::model_load(format!("cannot read {}: {err}", path.display())))
}
