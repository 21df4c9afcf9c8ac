use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};

// 使用infrastructure层的LoggerTrait
use crate::infrastructure::LoggerTrait;

/// 文件筛选条件
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub max_size: Option<u64>,
    pub excluded_dirs: HashSet<String>,
}

impl FileFilter {
    /// 创建新的文件过滤器
    pub fn new(max_size: Option<u64>, excluded_dirs: Vec<String>) -> Self {
        Self {
            max_size,
            excluded_dirs: excluded_dirs.into_iter().collect(),
        }
    }

    /// 检查文件是否符合大小要求
    pub fn matches_size(&self, size: u64) -> bool {
        self.max_size.map_or(true, |max| size <= max)
    }

    /// 检查目录名是否被排除
    pub fn is_dir_excluded(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| self.excluded_dirs.contains(name))
    }
}

/// 目录遍历器, 只产出普通文件, 不关心扩展名
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    recursive: bool,
    filter: FileFilter,
}

impl FileWalker {
    pub fn new(root: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            root: root.into(),
            recursive,
            filter: FileFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// 惰性遍历文件
    ///
    /// 非递归模式只产出根目录下的直接子文件; 顺序取决于文件系统。
    /// 目录, 指向目录的符号链接和其他非普通文件都被跳过。遍历错误只写入日志。
    pub fn walk<'a>(&self, logger: &'a dyn LoggerTrait) -> impl Iterator<Item = PathBuf> + 'a {
        let mut builder = WalkBuilder::new(&self.root);
        // 不遵循 .gitignore / 隐藏文件等规则, 所有文件都是候选
        builder.standard_filters(false).follow_links(false);
        if !self.recursive {
            builder.max_depth(Some(1));
        }

        let dir_filter = self.filter.clone();
        builder.filter_entry(move |entry| {
            !(entry.depth() > 0 && is_dir(entry) && dir_filter.is_dir_excluded(entry.path()))
        });

        let filter = self.filter.clone();
        builder.build().filter_map(move |result| {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    // 记录遍历错误
                    let _ = logger.log_message(&format!("walk error: {}", err));
                    return None;
                }
            };

            if entry.depth() == 0 || !is_regular_file(&entry) {
                return None;
            }

            // 只有设置了大小上限时才读取元数据
            if filter.max_size.is_some() {
                let size = std::fs::metadata(entry.path()).map(|m| m.len()).unwrap_or(0);
                if !filter.matches_size(size) {
                    let _ = logger.log_file(entry.path(), size, "skipped (size limit)");
                    return None;
                }
            }

            Some(entry.into_path())
        })
    }
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().map_or(false, |ft| ft.is_dir())
}

/// 普通文件, 或指向普通文件的符号链接
fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Logger;
    use std::fs;
    use tempfile::tempdir;

    fn tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("nested/c.txt"), "c").unwrap();
        fs::write(dir.path().join("nested/deeper/d.txt"), "d").unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/e.txt"), "e").unwrap();
        dir
    }

    fn names(root: &Path, walker: &FileWalker) -> Vec<String> {
        let logger = Logger::disabled();
        let mut names: Vec<String> = walker
            .walk(&logger)
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_size_filtering() {
        let filter = FileFilter::new(Some(1000), vec![]);

        assert!(filter.matches_size(500));
        assert!(filter.matches_size(1000));
        assert!(!filter.matches_size(2000));
        assert!(FileFilter::default().matches_size(u64::MAX));
    }

    #[test]
    fn test_dir_exclusion() {
        let filter = FileFilter::new(None, vec!["target".to_string()]);

        assert!(filter.is_dir_excluded(Path::new("project/target")));
        assert!(!filter.is_dir_excluded(Path::new("target/src")));
    }

    #[test]
    fn test_non_recursive_only_direct_children() {
        let dir = tree();
        let walker = FileWalker::new(dir.path(), false);

        assert_eq!(names(dir.path(), &walker), vec!["a.txt", "b.md"]);
    }

    #[test]
    fn test_recursive_includes_nested_files() {
        let dir = tree();
        let walker = FileWalker::new(dir.path(), true);

        assert_eq!(
            names(dir.path(), &walker),
            vec![
                "a.txt",
                "b.md",
                "nested/c.txt",
                "nested/deeper/d.txt",
                "target/e.txt"
            ]
        );
    }

    #[test]
    fn test_recursive_respects_excluded_dirs_and_size() {
        let dir = tree();
        fs::write(dir.path().join("big.txt"), "x".repeat(64)).unwrap();
        let filter = FileFilter::new(Some(8), vec!["deeper".to_string(), "target".to_string()]);
        let walker = FileWalker::new(dir.path(), true).with_filter(filter);

        assert_eq!(
            names(dir.path(), &walker),
            vec!["a.txt", "b.md", "nested/c.txt"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_skipped() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("nested"), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("a.txt"), dir.path().join("alias.txt")).unwrap();

        let walker = FileWalker::new(dir.path(), true);
        let found = names(dir.path(), &walker);

        assert!(!found.iter().any(|n| n.starts_with("link")));
        assert!(found.contains(&"alias.txt".to_string()));
    }
}
