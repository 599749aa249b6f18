pub mod build;
pub mod hash;
