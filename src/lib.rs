// Thematic: rank company profiles against investment themes
//
// This is the library root. Each module corresponds to a major subsystem:
// parsing inputs, embedding text, ranking, writing artifacts, and serving
// the ranked dataset over HTTP.

pub mod config;
pub mod db;
pub mod embeddings;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
