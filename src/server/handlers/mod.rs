// API处理器模块

pub mod filesystem;
pub mod image_content;
pub mod system;

pub use filesystem::*;
pub use image_content::*;
pub use system::*;
