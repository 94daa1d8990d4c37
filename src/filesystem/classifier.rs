// 图片类型判定
//
// 只按文件名后缀判断，不检查文件内容

use std::collections::HashSet;
use std::path::Path;

/// 默认允许的图片扩展名
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] =
    &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"];

/// 图片分类器
#[derive(Debug, Clone)]
pub struct ImageClassifier {
    extensions: HashSet<String>,
}

impl ImageClassifier {
    /// 创建分类器，扩展名统一规范为小写并带前导点
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// 文件名是否为允许的图片
    pub fn is_supported_image(&self, filename: &str) -> bool {
        extension_of(filename)
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl Default for ImageClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS)
    }
}

/// 获取小写扩展名（包含前导点）
///
/// `.gitkeep` 这类以点开头且没有其他点的文件没有扩展名
pub fn extension_of(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    Some(format!(".{}", ext.to_lowercase()))
}

/// 规范化配置中的扩展名：去空白、转小写、补前导点
pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().to_lowercase();
    if ext.is_empty() || ext == "." {
        return None;
    }
    if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{}", ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extensions() {
        let classifier = ImageClassifier::default();
        assert!(classifier.is_supported_image("photo.jpg"));
        assert!(classifier.is_supported_image("PHOTO.JPEG"));
        assert!(classifier.is_supported_image("icon.svg"));
        assert!(classifier.is_supported_image("archive.tar.png"));
        assert!(!classifier.is_supported_image("notes.txt"));
        assert!(!classifier.is_supported_image("photo.jpg.bak"));
        assert!(!classifier.is_supported_image("README"));
        assert!(!classifier.is_supported_image(".gitkeep"));
        assert!(!classifier.is_supported_image(".png"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.JPG"), Some(".jpg".to_string()));
        assert_eq!(extension_of("a.tar.gz"), Some(".gz".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
    }

    #[test]
    fn test_custom_extensions_are_normalized() {
        let classifier = ImageClassifier::new([" PNG ", ".Tiff", "", "."]);
        assert!(classifier.is_supported_image("x.png"));
        assert!(classifier.is_supported_image("x.TIFF"));
        assert!(!classifier.is_supported_image("x.jpg"));
        assert_eq!(classifier.extensions().count(), 2);
    }
}
