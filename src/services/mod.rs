pub mod compression;
pub mod relay;
pub mod staging;
pub mod tinify;
