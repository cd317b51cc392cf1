//! Disease descriptions and precautions shown alongside a prediction.
//!
//! Loaded from the dataset CSV files:
//! ```text
//! Disease,Description
//! Malaria,An infectious disease caused by protozoan parasites...
//!
//! Disease,Precaution_1,Precaution_2,Precaution_3,Precaution_4
//! Malaria,Consult nearest hospital,avoid oily food,,
//! ```

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const NO_DESCRIPTION: &str = "No description available.";
pub const NO_PRECAUTIONS: &str = "No specific precautions found.";

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV row {row}: {message}")]
    Row { row: usize, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct DiseaseKnowledge {
    /// Diseases in description-file order.
    diseases: Vec<String>,
    descriptions: HashMap<String, String>,
    precautions: HashMap<String, Vec<String>>,
}

impl DiseaseKnowledge {
    /// Empty knowledge base: every lookup returns the fallback text.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(description_path: &Path, precaution_path: &Path) -> Result<Self, KnowledgeError> {
        let descriptions = open(description_path)?;
        let precautions = open(precaution_path)?;
        let knowledge = Self::from_readers(descriptions, precautions)?;
        tracing::info!(
            diseases = knowledge.diseases.len(),
            with_precautions = knowledge.precautions.len(),
            "Disease knowledge base loaded"
        );
        Ok(knowledge)
    }

    /// Load, or log a warning and fall back to an empty knowledge base.
    pub fn load_or_empty(description_path: &Path, precaution_path: &Path) -> Self {
        match Self::load(description_path, precaution_path) {
            Ok(knowledge) => knowledge,
            Err(e) => {
                tracing::warn!(error = %e, "Disease knowledge base unavailable, using fallback texts");
                Self::empty()
            }
        }
    }

    pub fn from_readers<D: Read, P: Read>(descriptions: D, precautions: P) -> Result<Self, KnowledgeError> {
        let mut knowledge = Self::default();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(descriptions);
        for (row_idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| row_error(row_idx, e))?;
            let Some(disease) = record.get(0).map(str::trim).filter(|d| !d.is_empty()) else {
                continue;
            };
            let description = record.get(1).map(str::trim).unwrap_or_default();
            if !knowledge.descriptions.contains_key(disease) {
                knowledge.diseases.push(disease.to_string());
            }
            // Later rows win.
            knowledge
                .descriptions
                .insert(disease.to_string(), description.to_string());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(precautions);
        for (row_idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| row_error(row_idx, e))?;
            let Some(disease) = record.get(0).map(str::trim).filter(|d| !d.is_empty()) else {
                continue;
            };
            let steps: Vec<String> = record
                .iter()
                .skip(1)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            knowledge.precautions.insert(disease.to_string(), steps);
        }

        Ok(knowledge)
    }

    pub fn description(&self, disease: &str) -> &str {
        self.descriptions
            .get(disease)
            .map(String::as_str)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }

    pub fn precautions(&self, disease: &str) -> Vec<String> {
        match self.precautions.get(disease) {
            Some(steps) if !steps.is_empty() => steps.clone(),
            _ => vec![NO_PRECAUTIONS.to_string()],
        }
    }

    /// Every disease with a description, in file order.
    pub fn diseases(&self) -> &[String] {
        &self.diseases
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty() && self.precautions.is_empty()
    }
}

fn open(path: &Path) -> Result<std::io::BufReader<std::fs::File>, KnowledgeError> {
    let file = std::fs::File::open(path).map_err(|e| KnowledgeError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(std::io::BufReader::new(file))
}

fn row_error(row_idx: usize, e: csv::Error) -> KnowledgeError {
    KnowledgeError::Row {
        row: row_idx + 1,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTIONS: &str = "Disease,Description\n\
        Malaria,An infectious disease caused by protozoan parasites.\n\
        Common Cold,\"A viral infection of the nose and throat, usually harmless.\"\n\
        Migraine ,Recurring headaches.\n";

    const PRECAUTIONS: &str = "Disease,Precaution_1,Precaution_2,Precaution_3,Precaution_4\n\
        Malaria,Consult nearest hospital,avoid oily food,,\n\
        Common Cold,drink vitamin c rich drinks,take vapour,avoid cold food,keep fever in check\n\
        Migraine\n";

    fn knowledge() -> DiseaseKnowledge {
        DiseaseKnowledge::from_readers(DESCRIPTIONS.as_bytes(), PRECAUTIONS.as_bytes()).unwrap()
    }

    #[test]
    fn reads_descriptions_with_quoted_commas() {
        let kb = knowledge();
        assert_eq!(
            kb.description("Common Cold"),
            "A viral infection of the nose and throat, usually harmless."
        );
    }

    #[test]
    fn drops_blank_precaution_cells() {
        let kb = knowledge();
        assert_eq!(
            kb.precautions("Malaria"),
            vec!["Consult nearest hospital", "avoid oily food"]
        );
        assert_eq!(kb.precautions("Common Cold").len(), 4);
    }

    #[test]
    fn trims_disease_names() {
        let kb = knowledge();
        assert_eq!(kb.description("Migraine"), "Recurring headaches.");
    }

    #[test]
    fn unknown_disease_uses_fallbacks() {
        let kb = knowledge();
        assert_eq!(kb.description("Dengue"), NO_DESCRIPTION);
        assert_eq!(kb.precautions("Dengue"), vec![NO_PRECAUTIONS]);
    }

    #[test]
    fn disease_without_precautions_uses_fallback() {
        let kb = knowledge();
        assert_eq!(kb.precautions("Migraine"), vec![NO_PRECAUTIONS]);
    }

    #[test]
    fn diseases_keep_file_order() {
        let kb = knowledge();
        assert_eq!(kb.diseases(), &["Malaria", "Common Cold", "Migraine"]);
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let desc = dir.path().join("symptom_Description.csv");
        let prec = dir.path().join("symptom_precaution.csv");
        std::fs::write(&desc, DESCRIPTIONS).unwrap();
        std::fs::write(&prec, PRECAUTIONS).unwrap();

        let kb = DiseaseKnowledge::load(&desc, &prec).unwrap();
        assert_eq!(kb.diseases().len(), 3);
    }

    #[test]
    fn missing_files_fall_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kb = DiseaseKnowledge::load_or_empty(
            &dir.path().join("nope.csv"),
            &dir.path().join("nope2.csv"),
        );
        assert!(kb.is_empty());
        assert_eq!(kb.description("Malaria"), NO_DESCRIPTION);
    }
}
