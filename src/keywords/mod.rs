pub mod extractor;

pub use extractor::extract_keywords;
