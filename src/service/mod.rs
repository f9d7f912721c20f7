mod classifier_service;

pub use classifier_service::{ClassifierService, ClassifyError, InitError};
