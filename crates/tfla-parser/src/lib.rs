//! Terraform directory discovery and HCL parsing into the entity model

pub mod error;
pub mod terraform;
pub mod walker;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use error::ParseError;
pub use terraform::{ParseOptions, parse_directory, parse_file};
pub use walker::discover_tf_files;
