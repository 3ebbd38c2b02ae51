pub mod algorithm;
pub mod config;
pub mod vote;
pub mod window;

pub use algorithm::ContextClassifier;
pub use config::ClassifierConfig;
