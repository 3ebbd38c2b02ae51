pub mod catalog;
pub mod directive;
pub mod resolver;
pub mod sequencer;
pub mod service;

pub use catalog::{MoodCatalog, MoodEntry};
pub use directive::{Decision, PlaybackDirective, PlaybackNotice};
pub use resolver::{AssetResolver, BaseUrlResolver, LocalMediaResolver};
pub use sequencer::Sequencer;
pub use service::{PlaybackEvent, PlaybackResponse, PlaybackService, PlaybackTimeouts};
