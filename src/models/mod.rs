pub mod context;
pub mod sample;
pub mod token;

pub use context::{ContextLabel, ContextRecord, RawLabel};
pub use sample::Sample;
pub use token::{PlaybackToken, TokenDecode};
