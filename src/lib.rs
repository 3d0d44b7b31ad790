pub mod aggregate;
pub mod config;
pub mod derive;
pub mod domain;
pub mod error;
pub mod export;
pub mod filename;
pub mod metaspace;
pub mod output;
pub mod resolver;
pub mod table;
pub mod writer;
