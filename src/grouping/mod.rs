pub mod cluster;
pub mod similarity;
pub mod tokenize;
