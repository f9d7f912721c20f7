mod trainer;

pub use trainer::{TrainingError, TrainingSet, train};
