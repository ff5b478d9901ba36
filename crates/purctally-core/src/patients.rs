//! Read-only patient directory over a static JSON dataset.
//!
//! The dataset maps a patient id to an object of attributes:
//!
//! ```json
//! { "P001": { "name": "Ananya Verma", "height": 1.65, "weight": 90.0, "bmi": 33.06 } }
//! ```

use std::path::Path;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{PurcError, Result};

/// Attributes a directory can be sorted by.
pub const SORTABLE_FIELDS: [&str; 3] = ["height", "weight", "bmi"];

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = PurcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(PurcError::Config(format!(
                "invalid order '{}', select asc or desc",
                other
            ))),
        }
    }
}

/// Patients keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PatientDirectory {
    patients: Map<String, Value>,
}

impl PatientDirectory {
    /// Load the dataset from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| PurcError::Config(e.to_string()))?;

        match value {
            Value::Object(patients) => Ok(Self { patients }),
            _ => Err(PurcError::Config(
                "patient dataset must be a JSON object keyed by id".to_string(),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// The whole dataset.
    pub fn all(&self) -> &Map<String, Value> {
        &self.patients
    }

    /// One patient by id.
    pub fn get(&self, id: &str) -> Result<&Value> {
        self.patients
            .get(id)
            .ok_or_else(|| PurcError::NotFound(format!("patient id {}", id)))
    }

    /// Patients ordered by a numeric attribute. Missing or non-numeric values
    /// sort as 0.
    pub fn sorted_by(&self, field: &str, order: SortOrder) -> Result<Vec<&Value>> {
        if !SORTABLE_FIELDS.contains(&field) {
            return Err(PurcError::Config(format!(
                "invalid sort field '{}', select one of {:?}",
                field, SORTABLE_FIELDS
            )));
        }

        let key = |patient: &Value| patient.get(field).and_then(Value::as_f64).unwrap_or(0.0);

        let mut sorted: Vec<&Value> = self.patients.values().collect();
        sorted.sort_by(|a, b| {
            let ord = key(a).total_cmp(&key(b));
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "P001": {"name": "Ananya", "height": 1.65, "weight": 90.0, "bmi": 33.06},
        "P002": {"name": "Ravi", "height": 1.75, "weight": 65.0, "bmi": 21.22},
        "P003": {"name": "Sneha", "height": 1.60, "bmi": 27.1}
    }"#;

    fn names(patients: &[&Value]) -> Vec<String> {
        patients
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_get_patient() {
        let dir = PatientDirectory::from_json(DATASET).unwrap();

        assert_eq!(dir.len(), 3);
        assert_eq!(dir.get("P002").unwrap()["name"], "Ravi");
        assert!(matches!(dir.get("P999"), Err(PurcError::NotFound(_))));
    }

    #[test]
    fn test_sort_by_bmi() {
        let dir = PatientDirectory::from_json(DATASET).unwrap();

        let asc = dir.sorted_by("bmi", SortOrder::Asc).unwrap();
        assert_eq!(names(&asc), ["Ravi", "Sneha", "Ananya"]);

        let desc = dir.sorted_by("bmi", SortOrder::Desc).unwrap();
        assert_eq!(names(&desc), ["Ananya", "Sneha", "Ravi"]);
    }

    #[test]
    fn test_missing_value_sorts_as_zero() {
        let dir = PatientDirectory::from_json(DATASET).unwrap();

        let asc = dir.sorted_by("weight", SortOrder::Asc).unwrap();
        assert_eq!(names(&asc)[0], "Sneha");
    }

    #[test]
    fn test_rejects_unknown_field_and_order() {
        let dir = PatientDirectory::from_json(DATASET).unwrap();

        assert!(dir.sorted_by("age", SortOrder::Asc).is_err());
        assert!("up".parse::<SortOrder>().is_err());
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
    }

    #[test]
    fn test_rejects_non_object_dataset() {
        assert!(PatientDirectory::from_json("[1, 2]").is_err());
    }
}
