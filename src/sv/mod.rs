pub mod build;
pub mod release;

pub use build::Build;
pub use release::Release;
