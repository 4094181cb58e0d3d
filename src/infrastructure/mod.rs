pub mod compressor;
pub mod storage;
