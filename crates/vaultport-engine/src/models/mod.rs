pub mod blocks;
pub mod note;
pub mod report;

pub use blocks::*;
pub use note::*;
pub use report::*;
