pub mod classifiers;
pub mod features;
pub mod persistence;
pub mod server;
pub mod service;
pub mod training;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
