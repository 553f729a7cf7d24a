pub mod loading;
pub mod models;
pub mod parsing;
pub mod running;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use loading::{cancel::*, *};
pub use models::{summary::*, test::*};
pub use parsing::{CommonMark, FencedBlock, MarkdownParser, info::CodeInfo};
pub use running::{failure::*, recorder::*, scope::*, *};
