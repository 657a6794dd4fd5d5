//! # class-deps
//!
//! Decodes compiled Java classes and builds a class and package dependency graph
//! with afferent/efferent coupling metrics.
//!
//! ## Architecture
//!
//! - **reader**: Big-endian cursor over class-file bytes
//! - **constant_pool**: Constant pool decoding with two-slot long/double entries
//! - **attribute**: Named attribute records
//! - **annotation**: RuntimeVisibleAnnotations payload parsing
//! - **member**: Fields and methods, with descriptor type extraction
//! - **decoder**: Class-file decoding into [`class::DecodedClass`] plus decode listeners
//! - **filter**: Include/exclude prefixes and the inner-class toggle
//! - **scan**: Discovery of class files and archives under input paths
//! - **archive**: Reading class entries out of jar/zip/war files
//! - **graph**: Class graph assembly with placeholder nodes
//! - **group**: Group-by re-projection and package cycle detection
//! - **analysis**: Parallel batch driver collecting per-input failures
//! - **report**: JSON and text reports
//! - **config**: Config file resolution and merging with command-line input

pub mod analysis;
pub mod annotation;
pub mod archive;
pub mod attribute;
pub mod class;
pub mod cli;
pub mod config;
pub mod constant_pool;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod graph;
pub mod group;
pub mod member;
pub mod reader;
pub mod report;
pub mod scan;

#[cfg(test)]
mod fixture;
