mod document;
mod extractor;

pub use document::LoadError;
pub use extractor::{load, parse, ExtractOptions};
