pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod ocr;
pub mod optimize;
pub mod pipeline;
pub mod policy;
pub mod postprocess;
pub mod probe;
pub mod report;
pub mod tables;
pub mod util;
