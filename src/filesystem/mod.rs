// 沙箱文件系统模块
//
// 以只读方式暴露根目录下的子目录和图片文件，所有访问都必须经过路径守卫

mod classifier;
mod directory;
mod guard;
mod image;
mod probe;
mod types;

pub use classifier::{extension_of, ImageClassifier, DEFAULT_IMAGE_EXTENSIONS};
pub use directory::DirectoryService;
pub use guard::{resolve, PathGuard};
pub use image::ImageService;
pub use probe::{assert_is_directory, assert_is_file};
pub use types::*;

pub(crate) use classifier::normalize_extension;
