//! Turning a raw form payload into the fixed-order feature vector a model
//! was trained on.
//!
//! All category tables are frozen at training time and shipped inside the
//! model artifact, so the shape of the output never depends on which
//! categories appear in a single incoming record.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::InferenceError;

/// One submitted form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view: numbers pass, booleans are 0/1, numeric text is parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            // f64 Display prints integral values without a fraction ("1", not "1.0")
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Raw field map as submitted by a client.
pub type RawFields = HashMap<String, FieldValue>;

/// What to do with a category the artifact has never seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Fail with `UnknownCategory`.
    #[default]
    Reject,
    /// Encode as 0 (label encoders) or all-zero indicators (one-hot).
    Zero,
}

/// Fitted label encoder: the code of a class is its index.
///
/// Inputs are lower-cased before lookup, matching how the classes were
/// normalised at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn encode(
        &self,
        field: &str,
        value: &FieldValue,
        policy: UnknownCategoryPolicy,
    ) -> Result<f64, InferenceError> {
        let text = value.as_text().to_lowercase();
        match self.classes.iter().position(|c| *c == text) {
            Some(code) => Ok(code as f64),
            None => match policy {
                UnknownCategoryPolicy::Reject => Err(InferenceError::UnknownCategory {
                    field: field.to_string(),
                    value: value.as_text(),
                }),
                UnknownCategoryPolicy::Zero => Ok(0.0),
            },
        }
    }
}

/// Frozen dummy encoding with the first category dropped.
///
/// A field `Gender` with categories `[Female, Male]` yields the single
/// column `Gender_Male`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OneHotTable {
    pub categories: Vec<String>,
}

impl OneHotTable {
    pub fn columns(&self, field: &str) -> Vec<String> {
        self.categories
            .iter()
            .skip(1)
            .map(|c| format!("{field}_{c}"))
            .collect()
    }

    pub fn encode(
        &self,
        field: &str,
        value: &FieldValue,
        policy: UnknownCategoryPolicy,
    ) -> Result<Vec<(String, f64)>, InferenceError> {
        let text = value.as_text();
        let hit = self.categories.iter().position(|c| *c == text);
        if hit.is_none() && policy == UnknownCategoryPolicy::Reject {
            return Err(InferenceError::UnknownCategory {
                field: field.to_string(),
                value: text,
            });
        }

        Ok(self
            .columns(field)
            .into_iter()
            .enumerate()
            .map(|(i, column)| (column, if hit == Some(i + 1) { 1.0 } else { 0.0 }))
            .collect())
    }
}

/// Fitted standardisation: `(x - mean) / scale` per feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, values: &mut [f64]) {
        for ((x, mean), scale) in values.iter_mut().zip(&self.mean).zip(&self.scale) {
            // sklearn stores 1.0 for zero-variance columns; accept raw zeros too
            let scale = if *scale == 0.0 { 1.0 } else { *scale };
            *x = (*x - mean) / scale;
        }
    }
}

/// Preprocessing metadata produced alongside a trained classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preprocessing {
    #[serde(default)]
    pub label_encoders: BTreeMap<String, LabelEncoder>,
    #[serde(default)]
    pub one_hot: BTreeMap<String, OneHotTable>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default)]
    pub unknown_category: UnknownCategoryPolicy,
}

/// Named columns in training order, before scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl Preprocessing {
    /// Encode and reindex `raw` to `features`. Missing columns are 0 and
    /// fields that are not features are dropped.
    pub fn frame(&self, features: &[String], raw: &RawFields) -> Result<FeatureFrame, InferenceError> {
        let mut encoded: HashMap<String, f64> = HashMap::with_capacity(raw.len());
        let policy = self.unknown_category;

        for (field, value) in raw {
            if let Some(encoder) = self.label_encoders.get(field) {
                encoded.insert(field.clone(), encoder.encode(field, value, policy)?);
            } else if let Some(table) = self.one_hot.get(field) {
                encoded.extend(table.encode(field, value, policy)?);
            } else if features.iter().any(|f| f == field) {
                let number = value.as_number().ok_or_else(|| {
                    InferenceError::SchemaMismatch(format!(
                        "field '{field}' expects a number, got '{value}'"
                    ))
                })?;
                encoded.insert(field.clone(), number);
            } else {
                tracing::debug!(field = %field, "Ignoring field unknown to the model");
            }
        }

        let values = features
            .iter()
            .map(|f| encoded.get(f).copied().unwrap_or(0.0))
            .collect();
        Ok(FeatureFrame {
            columns: features.to_vec(),
            values,
        })
    }

    /// Full transform: frame, then scale when a scaler is present.
    pub fn vector(&self, features: &[String], raw: &RawFields) -> Result<Vec<f64>, InferenceError> {
        let mut values = self.frame(features, raw)?.values;
        if let Some(scaler) = &self.scaler {
            scaler.transform(&mut values);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn raw(pairs: &[(&str, FieldValue)]) -> RawFields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_field_value_text_rendering() {
        assert_eq!(FieldValue::Number(1.0).as_text(), "1");
        assert_eq!(FieldValue::Number(8.2).as_text(), "8.2");
        assert_eq!(FieldValue::Text("No Info".into()).as_text(), "No Info");
    }

    #[test]
    fn test_field_value_numbers() {
        assert_eq!(FieldValue::Bool(true).as_number(), Some(1.0));
        assert_eq!(FieldValue::Text(" 4.5 ".into()).as_number(), Some(4.5));
        assert_eq!(FieldValue::Text("male".into()).as_number(), None);
    }

    #[test]
    fn test_field_value_deserializes_untagged() {
        let fields: RawFields =
            serde_json::from_str(r#"{"age": 40, "gender": "male", "flag": true}"#).unwrap();
        assert_eq!(fields["age"], FieldValue::Number(40.0));
        assert_eq!(fields["gender"], FieldValue::Text("male".into()));
        assert_eq!(fields["flag"], FieldValue::Bool(true));
    }

    #[test]
    fn test_label_encoder_lowercases() {
        let enc = LabelEncoder { classes: names(&["female", "male", "other"]) };
        let code = enc
            .encode("gender", &"Male".into(), UnknownCategoryPolicy::Reject)
            .unwrap();
        assert_eq!(code, 1.0);
    }

    #[test]
    fn test_label_encoder_unknown_policy() {
        let enc = LabelEncoder { classes: names(&["female", "male"]) };
        let err = enc
            .encode("gender", &"robot".into(), UnknownCategoryPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, InferenceError::UnknownCategory { ref field, .. } if field == "gender"));

        let code = enc
            .encode("gender", &"robot".into(), UnknownCategoryPolicy::Zero)
            .unwrap();
        assert_eq!(code, 0.0);
    }

    #[test]
    fn test_one_hot_shape_is_fixed() {
        let table = OneHotTable { categories: names(&["Female", "Male"]) };
        let policy = UnknownCategoryPolicy::Reject;

        let male = table.encode("Gender", &"Male".into(), policy).unwrap();
        let female = table.encode("Gender", &"Female".into(), policy).unwrap();

        assert_eq!(male, vec![("Gender_Male".to_string(), 1.0)]);
        assert_eq!(female, vec![("Gender_Male".to_string(), 0.0)]);
    }

    #[test]
    fn test_one_hot_unknown_zero_policy() {
        let table = OneHotTable { categories: names(&["a", "b", "c"]) };
        let cols = table.encode("f", &"z".into(), UnknownCategoryPolicy::Zero).unwrap();
        assert_eq!(cols.len(), 2);
        assert!(cols.iter().all(|(_, v)| *v == 0.0));
    }

    #[test]
    fn test_frame_reindexes_and_fills_zero() {
        let prep = Preprocessing::default();
        let features = names(&["a", "b", "c"]);
        let frame = prep
            .frame(&features, &raw(&[("c", 3.0.into()), ("a", 1.0.into()), ("extra", 9.0.into())]))
            .unwrap();

        assert_eq!(frame.columns, features);
        assert_eq!(frame.values, vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_frame_rejects_text_for_numeric_feature() {
        let prep = Preprocessing::default();
        let err = prep
            .frame(&names(&["age"]), &raw(&[("age", "forty".into())]))
            .unwrap_err();
        assert!(matches!(err, InferenceError::SchemaMismatch(_)));
    }

    #[test]
    fn test_scaler_applied_in_vector() {
        let prep = Preprocessing {
            scaler: Some(StandardScaler { mean: vec![10.0, 0.0], scale: vec![2.0, 0.0] }),
            ..Preprocessing::default()
        };
        let v = prep
            .vector(&names(&["x", "y"]), &raw(&[("x", 14.0.into()), ("y", 3.0.into())]))
            .unwrap();
        assert_eq!(v, vec![2.0, 3.0]);
    }
}
