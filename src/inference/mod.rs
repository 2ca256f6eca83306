//! Inference dispatch: one pre-loaded model pipeline per disease.
//!
//! Pipelines are built from JSON artifacts at start-up and never reloaded.
//! A prediction runs the artifact's frozen preprocessing, then its
//! classifier, and reports the classifier's own probability.

mod artifact;
mod classifier;
mod preprocess;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use artifact::{ArtifactError, ModelArtifact};
pub use classifier::{Classifier, DecisionTree, TreeNode};
pub use preprocess::{
    FeatureFrame, FieldValue, LabelEncoder, OneHotTable, Preprocessing, RawFields, StandardScaler,
    UnknownCategoryPolicy,
};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Input does not fit the model: {0}")]
    SchemaMismatch(String),

    #[error("Unknown category '{value}' for field '{field}'")]
    UnknownCategory { field: String, value: String },

    #[error("No model loaded for {0}")]
    ModelUnavailable(Disease),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    Diabetes,
    BloodPressure,
    LungCancer,
}

impl Disease {
    pub const ALL: [Disease; 3] = [Self::Diabetes, Self::BloodPressure, Self::LungCancer];

    /// Name shown to users and stored in `patient_records.disease`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::BloodPressure => "Blood Pressure Abnormality",
            Self::LungCancer => "Lung Cancer",
        }
    }

    /// Path segment used by the HTTP API.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::BloodPressure => "blood-pressure",
            Self::LungCancer => "lung-cancer",
        }
    }

    pub fn artifact_file(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes.json",
            Self::BloodPressure => "blood_pressure.json",
            Self::LungCancer => "lung_cancer.json",
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Disease {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
        Self::ALL
            .into_iter()
            .find(|d| d.slug() == key || d.display_name().to_lowercase().replace(' ', "-") == key)
            .ok_or_else(|| format!("unknown disease '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    /// Text stored in `patient_records.diagnosis_result`.
    pub fn result_text(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::High => "High Risk",
        }
    }

    /// Class code as written to the audit logs.
    pub fn code(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub disease: Disease,
    pub label: RiskLabel,
    /// Probability of the high-risk class.
    pub probability: f64,
    /// Probability of the reported label, in percent, two decimals.
    pub confidence_percent: f64,
}

impl Prediction {
    pub fn from_probability(disease: Disease, probability: f64) -> Self {
        let label = if probability > 0.5 { RiskLabel::High } else { RiskLabel::Low };
        let confidence = probability.max(1.0 - probability) * 100.0;
        Self {
            disease,
            label,
            probability,
            confidence_percent: (confidence * 100.0).round() / 100.0,
        }
    }
}

/// A validated artifact ready to serve.
#[derive(Debug, Clone)]
pub struct ModelPipeline {
    artifact: ModelArtifact,
}

impl ModelPipeline {
    pub fn new(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn disease(&self) -> Disease {
        self.artifact.disease
    }

    pub fn features(&self) -> &[String] {
        &self.artifact.features
    }

    /// Encoded and reindexed columns, before scaling.
    pub fn frame(&self, raw: &RawFields) -> Result<FeatureFrame, InferenceError> {
        self.artifact.preprocessing.frame(&self.artifact.features, raw)
    }

    pub fn predict(&self, raw: &RawFields) -> Result<Prediction, InferenceError> {
        let x = self.artifact.preprocessing.vector(&self.artifact.features, raw)?;
        if x.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::SchemaMismatch("feature vector is not finite".to_string()));
        }
        let probability = self.artifact.classifier.predict_proba(&x);
        Ok(Prediction::from_probability(self.artifact.disease, probability))
    }
}

/// Routes a prediction request to the pipeline of its disease.
#[derive(Debug, Default)]
pub struct InferenceDispatcher {
    pipelines: HashMap<Disease, ModelPipeline>,
}

impl InferenceDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every disease's artifact from `dir`. Any failure is fatal.
    pub fn load_dir(dir: &Path) -> Result<Self, ArtifactError> {
        let mut dispatcher = Self::new();
        for disease in Disease::ALL {
            let path = dir.join(disease.artifact_file());
            let artifact = ModelArtifact::from_path(&path)?;
            if artifact.disease != disease {
                return Err(ArtifactError::Invalid {
                    disease,
                    reason: format!("{} holds a model for {}", path.display(), artifact.disease),
                });
            }
            dispatcher.register(artifact)?;
            tracing::info!(disease = %disease, path = %path.display(), "Loaded model artifact");
        }
        Ok(dispatcher)
    }

    pub fn register(&mut self, artifact: ModelArtifact) -> Result<(), ArtifactError> {
        let pipeline = ModelPipeline::new(artifact)?;
        self.pipelines.insert(pipeline.disease(), pipeline);
        Ok(())
    }

    pub fn pipeline(&self, disease: Disease) -> Result<&ModelPipeline, InferenceError> {
        self.pipelines
            .get(&disease)
            .ok_or(InferenceError::ModelUnavailable(disease))
    }

    pub fn predict(&self, disease: Disease, raw: &RawFields) -> Result<Prediction, InferenceError> {
        let prediction = self.pipeline(disease)?.predict(raw)?;
        tracing::info!(
            disease = %disease,
            label = ?prediction.label,
            confidence = prediction.confidence_percent,
            "Prediction complete"
        );
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const DIABETES_FEATURES: [&str; 8] = [
        "gender",
        "age",
        "hypertension",
        "heart_disease",
        "smoking_history",
        "bmi",
        "HbA1c_level",
        "blood_glucose_level",
    ];

    fn diabetes_artifact() -> ModelArtifact {
        let mut label_encoders = BTreeMap::new();
        label_encoders.insert(
            "gender".to_string(),
            LabelEncoder { classes: names(&["female", "male", "other"]) },
        );
        label_encoders.insert(
            "smoking_history".to_string(),
            LabelEncoder {
                classes: names(&["current", "ever", "former", "never", "no info", "not current"]),
            },
        );
        ModelArtifact {
            disease: Disease::Diabetes,
            features: names(&DIABETES_FEATURES),
            preprocessing: Preprocessing { label_encoders, ..Preprocessing::default() },
            classifier: Classifier::LogisticRegression {
                coefficients: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0],
                intercept: -13.0,
            },
        }
    }

    fn diabetes_fields(hba1c: f64) -> RawFields {
        let pairs: [(&str, FieldValue); 8] = [
            ("age", 55.into()),
            ("gender", "male".into()),
            ("hypertension", 0.into()),
            ("heart_disease", 1.into()),
            ("smoking_history", "No Info".into()),
            ("bmi", 27.5.into()),
            ("HbA1c_level", hba1c.into()),
            ("blood_glucose_level", 140.into()),
        ];
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_diabetes_frame_matches_training_order() {
        let pipeline = ModelPipeline::new(diabetes_artifact()).unwrap();
        let frame = pipeline.frame(&diabetes_fields(6.0)).unwrap();

        assert_eq!(frame.columns, names(&DIABETES_FEATURES));
        assert_eq!(frame.values, vec![1.0, 55.0, 0.0, 1.0, 4.0, 27.5, 6.0, 140.0]);
    }

    #[test]
    fn test_diabetes_label_follows_probability() {
        let mut dispatcher = InferenceDispatcher::new();
        dispatcher.register(diabetes_artifact()).unwrap();

        let high = dispatcher.predict(Disease::Diabetes, &diabetes_fields(8.5)).unwrap();
        assert_eq!(high.label, RiskLabel::High);
        assert!(high.confidence_percent > 50.0 && high.confidence_percent <= 100.0);

        let low = dispatcher.predict(Disease::Diabetes, &diabetes_fields(5.0)).unwrap();
        assert_eq!(low.label, RiskLabel::Low);
        assert!(low.probability < 0.5);
    }

    #[test]
    fn test_unloaded_disease_is_unavailable() {
        let dispatcher = InferenceDispatcher::new();
        let err = dispatcher.predict(Disease::LungCancer, &RawFields::new()).unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(Disease::LungCancer)));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let pipeline = ModelPipeline::new(diabetes_artifact()).unwrap();
        let mut fields = diabetes_fields(6.0);
        fields.insert("smoking_history".to_string(), "sometimes".into());
        assert!(matches!(
            pipeline.predict(&fields),
            Err(InferenceError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_lung_one_hot_then_scaled() {
        let mut one_hot = BTreeMap::new();
        one_hot.insert("Gender".to_string(), OneHotTable { categories: names(&["Female", "Male"]) });
        let artifact = ModelArtifact {
            disease: Disease::LungCancer,
            features: names(&["Age", "Smoking", "Gender_Male"]),
            preprocessing: Preprocessing {
                one_hot,
                scaler: Some(StandardScaler { mean: vec![40.0, 1.0, 0.5], scale: vec![10.0, 1.0, 0.5] }),
                ..Preprocessing::default()
            },
            classifier: Classifier::LogisticRegression { coefficients: vec![1.0, 1.0, 1.0], intercept: 0.0 },
        };
        let pipeline = ModelPipeline::new(artifact).unwrap();

        let pairs: [(&str, FieldValue); 3] =
            [("Age", 50.into()), ("Smoking", 2.into()), ("Gender", "Male".into())];
        let fields: RawFields = pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let frame = pipeline.frame(&fields).unwrap();
        assert_eq!(frame.values, vec![50.0, 2.0, 1.0]);

        // scaled: [1, 1, 1] -> z = 3
        let prediction = pipeline.predict(&fields).unwrap();
        let expected = 1.0 / (1.0 + (-3.0f64).exp());
        assert!((prediction.probability - expected).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_rounding() {
        let p = Prediction::from_probability(Disease::Diabetes, 0.123456);
        assert_eq!(p.label, RiskLabel::Low);
        assert_eq!(p.confidence_percent, 87.65);

        let even = Prediction::from_probability(Disease::Diabetes, 0.5);
        assert_eq!(even.label, RiskLabel::Low);
    }

    #[test]
    fn test_disease_parsing() {
        assert_eq!("diabetes".parse::<Disease>().unwrap(), Disease::Diabetes);
        assert_eq!("blood-pressure".parse::<Disease>().unwrap(), Disease::BloodPressure);
        assert_eq!("Blood Pressure Abnormality".parse::<Disease>().unwrap(), Disease::BloodPressure);
        assert_eq!("lung_cancer".parse::<Disease>().unwrap(), Disease::LungCancer);
        assert!("flu".parse::<Disease>().is_err());
    }

    #[test]
    fn test_shipped_artifacts_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let dispatcher = InferenceDispatcher::load_dir(&dir).expect("sample artifacts are valid");
        for disease in Disease::ALL {
            assert!(dispatcher.pipeline(disease).is_ok());
        }
    }
}
