pub mod classifier;
mod svm;

pub use classifier::{Classifier, Label};
pub use svm::{FitError, GAUSSIAN_KERNEL_EPS, REGULARIZATION, SvmClassifier};
