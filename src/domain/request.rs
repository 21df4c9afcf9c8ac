use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::decoders::normalize_extension;

/// 请求构建失败
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// 扩展名过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtensionFilter {
    /// `*`: 所有已注册格式
    #[default]
    All,
    /// 仅允许列出的扩展名 (小写, 不含点)
    Only(BTreeSet<String>),
}

impl ExtensionFilter {
    /// 解析逗号分隔的扩展名列表, 例如 `pdf, .TXT`
    ///
    /// 任一项为 `*` 或列表为空时返回 [`ExtensionFilter::All`]。
    pub fn parse(list: &str) -> Self {
        let mut exts = BTreeSet::new();
        for token in list.split(',') {
            let ext = normalize_extension(token);
            if ext == "*" {
                return ExtensionFilter::All;
            }
            if !ext.is_empty() {
                exts.insert(ext);
            }
        }

        if exts.is_empty() {
            ExtensionFilter::All
        } else {
            ExtensionFilter::Only(exts)
        }
    }

    pub fn allows(&self, extension: &str) -> bool {
        match self {
            ExtensionFilter::All => true,
            ExtensionFilter::Only(exts) => exts.contains(extension),
        }
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionFilter::All => f.write_str("*"),
            ExtensionFilter::Only(exts) => {
                let list: Vec<&str> = exts.iter().map(String::as_str).collect();
                f.write_str(&list.join(", "))
            }
        }
    }
}

/// 一次搜索的参数, 构建后不可变
#[derive(Debug, Clone)]
pub struct SearchRequest {
    keyword: String,
    root_directory: PathBuf,
    extensions: ExtensionFilter,
    case_sensitive: bool,
    recursive: bool,
    output_path: Option<PathBuf>,
}

impl SearchRequest {
    /// 创建请求; 根路径必须是目录
    pub fn new(
        keyword: impl Into<String>,
        root_directory: impl Into<PathBuf>,
    ) -> Result<Self, RequestError> {
        let root_directory = root_directory.into();
        if !root_directory.is_dir() {
            return Err(RequestError::NotADirectory(root_directory));
        }

        Ok(Self {
            keyword: keyword.into(),
            root_directory,
            extensions: ExtensionFilter::All,
            case_sensitive: false,
            recursive: false,
            output_path: None,
        })
    }

    pub fn with_extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_output(mut self, output_path: Option<PathBuf>) -> Self {
        self.output_path = output_path;
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn extensions(&self) -> &ExtensionFilter {
        &self.extensions
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_filter_parsing() {
        let filter = ExtensionFilter::parse(" PDF, .txt ,,md");
        assert!(filter.allows("pdf"));
        assert!(filter.allows("txt"));
        assert!(filter.allows("md"));
        assert!(!filter.allows("docx"));
        assert_eq!(filter.to_string(), "md, pdf, txt");
    }

    #[test]
    fn test_filter_all_sentinel() {
        assert_eq!(ExtensionFilter::parse("*"), ExtensionFilter::All);
        assert_eq!(ExtensionFilter::parse("txt,*"), ExtensionFilter::All);
        assert_eq!(ExtensionFilter::parse(""), ExtensionFilter::All);
        assert!(ExtensionFilter::All.allows("anything"));
    }

    #[test]
    fn test_request_requires_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(SearchRequest::new("cat", dir.path()).is_ok());

        let err = SearchRequest::new("cat", &file).unwrap_err();
        assert!(err.to_string().starts_with("Invalid directory"));
        assert!(SearchRequest::new("cat", dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_request_builder_defaults() {
        let dir = tempdir().unwrap();
        let request = SearchRequest::new("cat", dir.path())
            .unwrap()
            .with_recursive(true);

        assert_eq!(request.keyword(), "cat");
        assert!(request.recursive());
        assert!(!request.case_sensitive());
        assert_eq!(request.extensions(), &ExtensionFilter::All);
        assert!(request.output_path().is_none());
    }
}
