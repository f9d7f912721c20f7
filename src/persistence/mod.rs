mod model_store;

pub use model_store::{DEFAULT_MODEL_PATH, ModelStore, StoreError};
