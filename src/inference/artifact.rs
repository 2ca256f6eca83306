use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Disease;
use super::classifier::Classifier;
use super::preprocess::Preprocessing;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Cannot read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model artifact for {disease}: {reason}")]
    Invalid { disease: Disease, reason: String },
}

/// Serialized output of the offline training step for one disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub disease: Disease,
    /// Training feature names, in the order the classifier expects.
    pub features: Vec<String>,
    #[serde(default)]
    pub preprocessing: Preprocessing,
    pub classifier: Classifier,
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: Self = serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Reject artifacts whose parts disagree about the feature vector.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            disease: self.disease,
            reason,
        };
        let n = self.features.len();

        if n == 0 {
            return Err(invalid("no features".to_string()));
        }
        if let Some(scaler) = &self.preprocessing.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(invalid(format!(
                    "scaler has {}/{} entries for {} features",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    n
                )));
            }
        }
        for (field, encoder) in &self.preprocessing.label_encoders {
            if encoder.classes.is_empty() {
                return Err(invalid(format!("label encoder '{field}' has no classes")));
            }
        }
        for (field, table) in &self.preprocessing.one_hot {
            if table.categories.is_empty() {
                return Err(invalid(format!("one-hot table '{field}' has no categories")));
            }
        }
        self.classifier.check(n).map_err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::preprocess::StandardScaler;
    use std::io::Write;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            disease: Disease::BloodPressure,
            features: vec!["Age".to_string(), "BMI".to_string()],
            preprocessing: Preprocessing::default(),
            classifier: Classifier::LogisticRegression { coefficients: vec![0.1, 0.2], intercept: -1.0 },
        }
    }

    #[test]
    fn test_scaler_width_must_match() {
        let mut a = artifact();
        a.preprocessing.scaler = Some(StandardScaler { mean: vec![0.0], scale: vec![1.0] });
        assert!(matches!(a.validate(), Err(ArtifactError::Invalid { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&artifact()).unwrap().as_bytes()).unwrap();

        let loaded = ModelArtifact::from_path(file.path()).unwrap();
        assert_eq!(loaded, artifact());
    }

    #[test]
    fn test_garbage_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(matches!(
            ModelArtifact::from_path(file.path()),
            Err(ArtifactError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelArtifact::from_path(&dir.path().join("absent.json")),
            Err(ArtifactError::Io { .. })
        ));
    }
}
