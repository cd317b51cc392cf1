//! Feedback sink: user corrections of wrong predictions, kept for retraining.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const HEADER: [&str; 3] = ["User_Symptoms", "Predicted_Disease", "Correct_Disease"];

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Feedback file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Feedback CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// One `(user_symptoms, predicted_disease, corrected_disease)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub user_symptoms: String,
    pub predicted_disease: String,
    pub correct_disease: String,
}

impl FeedbackEntry {
    /// Only a real correction is worth keeping.
    pub fn is_correction(&self) -> bool {
        let correct = self.correct_disease.trim();
        !correct.is_empty() && correct != self.predicted_disease.trim()
    }
}

/// Append-only CSV feedback file.
pub struct FeedbackSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackSink {
    /// Create the file (with parent directories and header) if missing.
    pub fn open(path: &Path) -> Result<Self, FeedbackError> {
        let io_err = |source| FeedbackError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        if !path.exists() {
            let mut writer = csv::Writer::from_path(path)?;
            writer.write_record(HEADER)?;
            writer.flush().map_err(io_err)?;
            tracing::info!(path = %path.display(), "Created feedback file");
        }

        Ok(Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry` if it is a correction. Returns whether a row was written.
    pub fn record(&self, entry: &FeedbackEntry) -> Result<bool, FeedbackError> {
        if !entry.is_correction() {
            tracing::debug!("Feedback matches prediction, nothing recorded");
            return Ok(false);
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| FeedbackError::LockPoisoned)?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| FeedbackError::Io {
                path: self.path.clone(),
                source,
            })?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record([
            entry.user_symptoms.as_str(),
            entry.predicted_disease.trim(),
            entry.correct_disease.trim(),
        ])?;
        writer.flush().map_err(|source| FeedbackError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            predicted = %entry.predicted_disease,
            correct = %entry.correct_disease,
            "Prediction feedback recorded"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(predicted: &str, correct: &str) -> FeedbackEntry {
        FeedbackEntry {
            user_symptoms: "fever, chills".into(),
            predicted_disease: predicted.into(),
            correct_disease: correct.into(),
        }
    }

    fn rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn open_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset").join("feedback.csv");
        FeedbackSink::open(&path).unwrap();
        assert_eq!(
            rows(&path),
            vec![vec!["User_Symptoms", "Predicted_Disease", "Correct_Disease"]]
        );
    }

    #[test]
    fn reopen_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        FeedbackSink::open(&path)
            .unwrap()
            .record(&entry("Flu", "Malaria"))
            .unwrap();
        FeedbackSink::open(&path).unwrap();
        assert_eq!(rows(&path).len(), 2);
    }

    #[test]
    fn records_corrections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        let sink = FeedbackSink::open(&path).unwrap();

        assert!(sink.record(&entry("Flu", "Malaria")).unwrap());
        assert_eq!(rows(&path)[1], vec!["fever, chills", "Flu", "Malaria"]);
    }

    #[test]
    fn skips_agreement_and_blank_corrections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        let sink = FeedbackSink::open(&path).unwrap();

        assert!(!sink.record(&entry("Flu", "Flu")).unwrap());
        assert!(!sink.record(&entry("Flu", "  ")).unwrap());
        assert_eq!(rows(&path).len(), 1);
    }

    #[test]
    fn concurrent_records_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        let sink = Arc::new(FeedbackSink::open(&path).unwrap());

        std::thread::scope(|scope| {
            for i in 0..8 {
                let sink = sink.clone();
                scope.spawn(move || {
                    sink.record(&entry("Flu", &format!("Disease {i}"))).unwrap();
                });
            }
        });

        let rows = rows(&path);
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().skip(1).all(|r| r.len() == 3));
    }
}
