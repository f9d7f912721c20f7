use crate::classifiers::{Classifier, Label};
use crate::features::FeatureVector;
use linfa::dataset::Dataset;
use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Misclassification penalty applied to both classes.
pub const REGULARIZATION: f64 = 100.0;

/// Width of the Gaussian kernel, `exp(-‖x−y‖² / eps)`, sized for
/// unit-normalized histogram features.
pub const GAUSSIAN_KERNEL_EPS: f64 = 1.0;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("no training samples")]
    NoSamples,
    #[error("feature vectors must share one dimensionality")]
    MixedDimensions,
    #[error("got {features} feature vectors but {labels} labels")]
    LabelCount { features: usize, labels: usize },
    #[error("svm training failed: {0}")]
    Svm(#[from] linfa_svm::SvmError),
}

/// Two-class support vector machine over histogram features.
///
/// The underlying solver is opaque; this type only promises the
/// fit/predict contract and a stable serialized form for
/// [`crate::persistence::ModelStore`].
#[derive(Debug, Serialize, Deserialize)]
pub struct SvmClassifier {
    svm: Svm<f64, bool>,
}

impl SvmClassifier {
    /// Fits a classifier on parallel slices of features and labels.
    pub fn fit(features: &[FeatureVector], labels: &[Label]) -> Result<Self, FitError> {
        let dimensions = features.first().ok_or(FitError::NoSamples)?.len();
        if features.iter().any(|f| f.len() != dimensions) {
            return Err(FitError::MixedDimensions);
        }
        if features.len() != labels.len() {
            return Err(FitError::LabelCount {
                features: features.len(),
                labels: labels.len(),
            });
        }

        let records = Array2::from_shape_fn((features.len(), dimensions), |(i, j)| {
            features[i].as_slice()[j]
        });
        let targets = Array1::from_iter(labels.iter().map(|l| *l == Label::ClassB));
        let dataset = Dataset::new(records, targets);

        let svm = Svm::<f64, bool>::params()
            .pos_neg_weights(REGULARIZATION, REGULARIZATION)
            .gaussian_kernel(GAUSSIAN_KERNEL_EPS)
            .fit(&dataset)?;

        Ok(Self { svm })
    }
}

impl Classifier for SvmClassifier {
    fn predict(&self, features: &FeatureVector) -> Label {
        let row =
            Array2::from_shape_fn((1, features.len()), |(_, j)| features.as_slice()[j]);
        if self.svm.predict(&row)[0] {
            Label::ClassB
        } else {
            Label::ClassA
        }
    }
}
