pub mod asset;
pub mod bar;
pub mod indicator;
pub mod source;
