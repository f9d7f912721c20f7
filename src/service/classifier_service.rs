use crate::classifiers::{Classifier, Label, SvmClassifier};
use crate::features::{ColorHistogram, FeatureError};
use crate::persistence::{ModelStore, StoreError};
use crate::training::{self, TrainingError, TrainingSet};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("request bytes are not a decodable image: {0}")]
    Undecodable(#[source] image::ImageError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Process-lifetime owner of the trained model.
///
/// Classification decodes the raw bytes, extracts features with the
/// same extractor configuration used at training time, and maps the
/// model's label back to the training directory path of that class.
/// The path string is the response payload clients rely on.
#[derive(Debug)]
pub struct ClassifierService<C = SvmClassifier> {
    model: C,
    extractor: ColorHistogram,
    class_a: String,
    class_b: String,
}

impl<C: Classifier> ClassifierService<C> {
    pub fn new(model: C, set: &TrainingSet) -> Self {
        Self {
            model,
            extractor: ColorHistogram::default(),
            class_a: set.class_a.to_string_lossy().into_owned(),
            class_b: set.class_b.to_string_lossy().into_owned(),
        }
    }

    /// Classifies one encoded image, returning the class identifier.
    ///
    /// Never mutates the model; any number of calls may run against a
    /// shared service.
    pub fn classify(&self, bytes: &[u8]) -> Result<&str, ClassifyError> {
        let image = image::load_from_memory(bytes).map_err(ClassifyError::Undecodable)?;
        let features = self.extractor.extract(&image)?;
        Ok(match self.model.predict(&features) {
            Label::ClassA => &self.class_a,
            Label::ClassB => &self.class_b,
        })
    }

    pub fn model(&self) -> &C {
        &self.model
    }
}

impl ClassifierService<SvmClassifier> {
    /// Builds the service by loading a persisted model, or by training
    /// one when none is stored.
    ///
    /// A freshly trained model is saved before the service is returned,
    /// so it survives even when the process is interrupted right after
    /// startup. A stored model that fails to load is an error, never a
    /// silent retrain.
    pub fn initialize(set: &TrainingSet, store: &ModelStore) -> Result<Self, InitError> {
        let model = if store.exists() {
            info!(path = %store.path().display(), "loading an existing classifier");
            store.load()?
        } else {
            info!("training classifier");
            let model = training::train(set, &ColorHistogram::default())?;
            store.save(&model)?;
            model
        };
        Ok(Self::new(model, set))
    }
}
