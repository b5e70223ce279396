pub mod diversity;
pub mod filter;
pub mod label;
pub mod policy;
pub mod query;
pub mod scoring;
