//! Per-disease input forms: the fields a client must submit, their ranges
//! and choices, and how a submission is summarised into a patient record.

use serde::Serialize;

use crate::inference::{Disease, FieldValue, RawFields};
use crate::store::limits;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FormError {
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Integer { min: i64, max: i64 },
    Decimal { min: f64, max: f64 },
    Choice { options: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

const fn integer(name: &'static str, label: &'static str, min: i64, max: i64) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Integer { min, max } }
}

const fn decimal(name: &'static str, label: &'static str, min: f64, max: f64) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Decimal { min, max } }
}

const fn choice(name: &'static str, label: &'static str, options: &'static [&'static str]) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Choice { options } }
}

const BINARY: &[&str] = &["0", "1"];
const SEVERITY: &[&str] = &["0", "1", "2"];

const DIABETES_FORM: &[FieldSpec] = &[
    integer("age", "Age", 0, 120),
    choice("gender", "Gender", &["male", "female"]),
    choice("hypertension", "Hypertension (0=No, 1=Yes)", BINARY),
    choice("heart_disease", "Heart Disease (0=No, 1=Yes)", BINARY),
    choice(
        "smoking_history",
        "Smoking History",
        &["never", "current", "former", "not current", "ever", "No Info"],
    ),
    decimal("bmi", "BMI", 10.0, 60.0),
    decimal("HbA1c_level", "HbA1c Level", 3.0, 15.0),
    integer("blood_glucose_level", "Blood Glucose Level", 50, 400),
];

const BLOOD_PRESSURE_FORM: &[FieldSpec] = &[
    decimal("Level_of_Hemoglobin", "Level of Hemoglobin", 5.0, 20.0),
    decimal("Genetic_Pedigree_Coefficient", "Genetic Pedigree Coefficient", 0.0, 2.0),
    integer("Age", "Age", 0, 120),
    decimal("BMI", "BMI", 10.0, 60.0),
    choice("Sex", "Sex (0=Male, 1=Female)", BINARY),
    choice("Pregnancy", "Pregnancy (0/1)", BINARY),
    choice("Smoking", "Smoking (0/1)", BINARY),
    decimal("Physical_activity", "Physical activity", 0.0, 50000.0),
    decimal("salt_content_in_the_diet", "Salt content (in mg) in the diet", 0.0, 50000.0),
    decimal("alcohol_consumption_per_day", "Alcohol consumption per day (in ml)", 0.0, 10000.0),
    choice("Level_of_Stress", "Level of Stress (1-3)", &["1", "2", "3"]),
    choice("Chronic_kidney_disease", "Chronic kidney disease (0/1)", BINARY),
    choice("Adrenal_and_thyroid_disorders", "Adrenal and thyroid disorders (0/1)", BINARY),
];

const LUNG_CANCER_FORM: &[FieldSpec] = &[
    integer("Age", "Age", 0, 120),
    choice("Gender", "Gender", &["Male", "Female"]),
    choice("Smoking", "Smoking (0=None, 1=Yes, 2=Heavy)", SEVERITY),
    choice("Chronic Lung Disease", "Chronic Lung Disease", BINARY),
    choice("Fatigue", "Fatigue (0=None, 1=Mild, 2=Severe)", SEVERITY),
    choice("Dust Allergy", "Dust Allergy", BINARY),
    choice("Wheezing", "Wheezing", BINARY),
    choice("Alcohol use", "Alcohol use", BINARY),
    choice("Coughing of Blood", "Coughing of Blood (0=None, 1=Yes, 2=Severe)", SEVERITY),
    choice("Shortness of Breath", "Shortness of Breath (0=None, 1=Mild, 2=Severe)", SEVERITY),
    choice("Swallowing Difficulty", "Swallowing Difficulty", BINARY),
    choice("Chest Pain", "Chest Pain (0=None, 1=Mild, 2=Severe)", SEVERITY),
    choice("Genetic Risk", "Genetic Risk (0=None, 1=Low, 2=Medium, 3=High)", &["0", "1", "2", "3"]),
    choice("Weight Loss", "Weight Loss (0=None, 1=Mild, 2=Severe)", SEVERITY),
];

pub fn form(disease: Disease) -> &'static [FieldSpec] {
    match disease {
        Disease::Diabetes => DIABETES_FORM,
        Disease::BloodPressure => BLOOD_PRESSURE_FORM,
        Disease::LungCancer => LUNG_CANCER_FORM,
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> FormError {
    FormError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Check a submission against the disease's form. Every form field is
/// required and no other field is accepted.
pub fn validate(disease: Disease, fields: &RawFields) -> Result<(), FormError> {
    let specs = form(disease);

    if let Some(extra) = fields.keys().find(|k| !specs.iter().any(|s| s.name == k.as_str())) {
        return Err(invalid(extra, "not part of the form"));
    }

    for spec in specs {
        let value = fields.get(spec.name).ok_or_else(|| invalid(spec.name, "missing"))?;
        match spec.kind {
            FieldKind::Integer { min, max } => {
                let n = value.as_number().ok_or_else(|| invalid(spec.name, "expected a number"))?;
                if n.fract() != 0.0 {
                    return Err(invalid(spec.name, "expected a whole number"));
                }
                if n < min as f64 || n > max as f64 {
                    return Err(invalid(spec.name, format!("must be between {min} and {max}")));
                }
            }
            FieldKind::Decimal { min, max } => {
                let n = value.as_number().ok_or_else(|| invalid(spec.name, "expected a number"))?;
                if !(min..=max).contains(&n) {
                    return Err(invalid(spec.name, format!("must be between {min} and {max}")));
                }
            }
            FieldKind::Choice { options } => {
                let text = value.as_text();
                if !options.contains(&text.as_str()) {
                    return Err(invalid(spec.name, format!("must be one of {}", options.join(", "))));
                }
            }
        }
    }
    Ok(())
}

/// The patient name must fit `patient_records.patient_name`.
pub fn validate_patient_name(name: &str) -> Result<(), FormError> {
    if name.trim().chars().count() > limits::PATIENT_NAME {
        return Err(invalid(
            "patient_name",
            format!("must be at most {} characters", limits::PATIENT_NAME),
        ));
    }
    Ok(())
}

/// Which fields of a submission fill the columns of a patient record.
struct RecordProfile {
    age: &'static str,
    gender: &'static str,
    gender_codes: &'static [(&'static str, &'static str)],
    symptoms: &'static [(&'static str, &'static str)],
}

fn profile(disease: Disease) -> RecordProfile {
    match disease {
        Disease::Diabetes => RecordProfile {
            age: "age",
            gender: "gender",
            gender_codes: &[],
            symptoms: &[("HbA1c", "HbA1c_level"), ("Glucose", "blood_glucose_level")],
        },
        Disease::BloodPressure => RecordProfile {
            age: "Age",
            gender: "Sex",
            gender_codes: &[("0", "Male"), ("1", "Female")],
            symptoms: &[
                ("Hemoglobin", "Level_of_Hemoglobin"),
                ("BMI", "BMI"),
                ("Stress", "Level_of_Stress"),
            ],
        },
        Disease::LungCancer => RecordProfile {
            age: "Age",
            gender: "Gender",
            gender_codes: &[],
            symptoms: &[
                ("Smoking", "Smoking"),
                ("Coughing of Blood", "Coughing of Blood"),
                ("Chest Pain", "Chest Pain"),
                ("Shortness of Breath", "Shortness of Breath"),
            ],
        },
    }
}

/// Age, gender and symptom list of a validated submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub age: i32,
    pub gender: String,
    pub symptoms: Vec<String>,
}

pub fn summarize(disease: Disease, fields: &RawFields) -> RecordSummary {
    let profile = profile(disease);

    let age = fields
        .get(profile.age)
        .and_then(FieldValue::as_number)
        .map_or(0, |n| n.round() as i32);

    let gender = match fields.get(profile.gender) {
        Some(value) => {
            let text = value.as_text();
            profile
                .gender_codes
                .iter()
                .find(|(code, _)| *code == text)
                .map_or(text, |(_, name)| name.to_string())
        }
        None => "Unknown".to_string(),
    };

    let symptoms = profile
        .symptoms
        .iter()
        .filter_map(|(label, field)| fields.get(*field).map(|v| format!("{label}: {v}")))
        .collect();

    RecordSummary { age, gender, symptoms }
}
