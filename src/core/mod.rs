pub mod audio;
pub mod input;
pub mod language;
pub mod render;
pub mod timing;
