pub mod config;
pub mod error;
pub mod grouping;
pub mod headlines;
pub mod keywords;
pub mod monitoring;
pub mod news;
pub mod pipeline;
pub mod report;
pub mod summarizer;
