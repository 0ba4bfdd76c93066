pub mod build;
pub mod release;
