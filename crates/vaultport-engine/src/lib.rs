pub mod builder;
pub mod inline;
pub mod io;
pub mod models;
pub mod parsing;
pub mod resolve;
pub mod store;

// Re-export key types for easier usage
pub use builder::BlockBuilder;
pub use inline::Segmenter;
pub use models::{blocks::*, note::*, report::*};
pub use parsing::{NoteParser, ParseError};
pub use resolve::Resolver;
pub use store::*;
