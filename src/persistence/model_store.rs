use crate::classifiers::SvmClassifier;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Default location of the persisted classifier, relative to the
/// directory the server was started from.
pub const DEFAULT_MODEL_PATH: &str = "classifier";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corrupt classifier file: {0}")]
    Corrupt(#[source] bincode::Error),
    #[error("could not encode classifier: {0}")]
    Encode(#[source] bincode::Error),
    #[error("could not write classifier file: {0}")]
    WriteFailed(#[source] std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Durable storage for a trained classifier.
///
/// The on-disk format is an opaque binary encoding understood only by
/// this store; no cross-version compatibility is promised. Absence of
/// the file means "no trained model yet".
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<SvmClassifier, StoreError> {
        let bytes = fs::read(&self.path)?;
        bincode::deserialize(&bytes).map_err(StoreError::Corrupt)
    }

    /// Writes the model durably.
    ///
    /// The encoding goes to a temporary file in the target directory
    /// which is then renamed over the destination, so a concurrent
    /// [`load`](Self::load) never observes a half-written file.
    pub fn save(&self, model: &SvmClassifier) -> Result<(), StoreError> {
        let bytes = bincode::serialize(model).map_err(StoreError::Encode)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(StoreError::WriteFailed)?;
        tmp.write_all(&bytes).map_err(StoreError::WriteFailed)?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::WriteFailed(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{Classifier, Label, SvmClassifier};
    use crate::features::{ColorHistogram, FeatureVector};
    use crate::testing::dummies::{noise_rgb, two_tone_rgb};
    use tempfile::tempdir;

    fn trained_model() -> (SvmClassifier, Vec<FeatureVector>) {
        let extractor = ColorHistogram::default();
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            let reddish = two_tone_rgb([255, 0, 0], [255, 255, 255], 44 + 2 * i);
            features.push(extractor.extract(&reddish).unwrap());
            labels.push(Label::ClassA);
            let bluish = two_tone_rgb([0, 0, 255], [255, 255, 255], 44 + 2 * i);
            features.push(extractor.extract(&bluish).unwrap());
            labels.push(Label::ClassB);
        }
        let model = SvmClassifier::fit(&features, &labels).unwrap();

        let probes = (0..4)
            .map(|seed| extractor.extract(&noise_rgb(seed, 16, 16)).unwrap())
            .chain(features.into_iter().take(4))
            .collect();
        (model, probes)
    }

    #[test]
    fn exists_reflects_the_file() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier"));
        assert!(!store.exists());

        let (model, _) = trained_model();
        store.save(&model).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn saved_model_round_trips_predictions() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier"));
        let (model, probes) = trained_model();

        store.save(&model).unwrap();
        let restored = store.load().unwrap();

        for probe in &probes {
            assert_eq!(model.predict(probe), restored.predict(probe));
        }
    }

    #[test]
    fn save_replaces_an_existing_file() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier"));
        let (model, probes) = trained_model();

        store.save(&model).unwrap();
        store.save(&model).unwrap();
        let restored = store.load().unwrap();
        assert_eq!(model.predict(&probes[0]), restored.predict(&probes[0]));
    }

    #[test]
    fn unreadable_bytes_are_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("classifier");
        std::fs::write(&path, b"not a classifier").unwrap();

        let err = ModelStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn loading_a_missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = ModelStore::new(dir.path().join("classifier"))
            .load()
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
