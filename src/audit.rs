//! Append-only CSV audit of predictions, one file per disease.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::forms;
use crate::inference::{Disease, RawFields, RiskLabel};

pub fn audit_file(disease: Disease) -> Option<&'static str> {
    match disease {
        Disease::Diabetes => None,
        Disease::BloodPressure => Some("bp.csv"),
        Disease::LungCancer => Some("lungcancer.csv"),
    }
}

pub struct AuditLog {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append the submission in form order plus the label code. Returns the
    /// file written, or `None` for diseases without an audit file.
    pub fn append(
        &self,
        disease: Disease,
        fields: &RawFields,
        label: RiskLabel,
    ) -> io::Result<Option<PathBuf>> {
        let Some(name) = audit_file(disease) else {
            return Ok(None);
        };
        let path = self.dir.join(name);

        let mut cells: Vec<String> = forms::form(disease)
            .iter()
            .map(|spec| fields.get(spec.name).map(|v| escape(&v.as_text())).unwrap_or_default())
            .collect();
        cells.push(label.code().to_string());
        let line = format!("{}\n", cells.join(","));

        // One write per row under the lock keeps rows whole
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;

        tracing::debug!(disease = %disease, path = %path.display(), "Audit row appended");
        Ok(Some(path))
    }
}

fn escape(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::FieldValue;

    fn lung_fields() -> RawFields {
        let pairs: [(&str, FieldValue); 14] = [
            ("Age", 61.into()),
            ("Gender", "Male".into()),
            ("Smoking", 2.into()),
            ("Chronic Lung Disease", 1.into()),
            ("Fatigue", 1.into()),
            ("Dust Allergy", 0.into()),
            ("Wheezing", 1.into()),
            ("Alcohol use", 0.into()),
            ("Coughing of Blood", 2.into()),
            ("Shortness of Breath", 2.into()),
            ("Swallowing Difficulty", 0.into()),
            ("Chest Pain", 1.into()),
            ("Genetic Risk", 3.into()),
            ("Weight Loss", 1.into()),
        ];
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_rows_append_in_form_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        let path = log.append(Disease::LungCancer, &lung_fields(), RiskLabel::High).unwrap();
        log.append(Disease::LungCancer, &lung_fields(), RiskLabel::Low).unwrap();

        let path = path.unwrap();
        assert_eq!(path, dir.path().join("lungcancer.csv"));
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "61,Male,2,1,1,0,1,0,2,2,0,1,3,1,1\n61,Male,2,1,1,0,1,0,2,2,0,1,3,1,0\n"
        );
    }

    #[test]
    fn test_diabetes_has_no_audit_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        let written = log.append(Disease::Diabetes, &RawFields::new(), RiskLabel::High).unwrap();
        assert_eq!(written, None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_escape_quotes_special_values() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("absent"));
        assert!(log.append(Disease::BloodPressure, &RawFields::new(), RiskLabel::Low).is_err());
    }
}
