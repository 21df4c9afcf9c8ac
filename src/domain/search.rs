use std::path::Path;

use serde::{Deserialize, Serialize};

use super::decoders::{DecodeError, DecoderRegistry};
use super::file_walker::{FileFilter, FileWalker};
use super::request::{ExtensionFilter, SearchRequest};
use crate::infrastructure::LoggerTrait;

/// 单个文件的匹配结果, 只为至少命中一次的文件创建
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "file")]
    pub file_path: String,
    pub extension: String,
    pub count: u64,
}

/// 一次扫描的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// 所有结果 count 之和
    pub total_matches: u64,
    /// 按访问顺序排列的结果
    pub results: Vec<MatchResult>,
    /// 交给解码器处理的文件数
    pub files_scanned: u64,
    /// 解码失败的文件数
    pub files_failed: u64,
}

impl ScanSummary {
    pub fn matched_files(&self) -> u64 {
        self.results.len() as u64
    }
}

/// 文件被跳过的原因 (不是错误)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 扩展名不在过滤列表中
    Filtered,
    /// 没有注册对应的解码器
    Unsupported,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Filtered => "skipped (extension filter)",
            SkipReason::Unsupported => "skipped (unsupported format)",
        }
    }
}

/// 扫描过程的观察者, 用于控制台输出和日志
pub trait ScanObserver {
    fn file_skipped(&mut self, _path: &Path, _reason: SkipReason) {}

    /// 解码成功, 无论是否命中
    fn file_decoded(&mut self, _path: &Path, _count: u64) {}

    fn match_found(&mut self, result: &MatchResult);

    fn decode_failed(&mut self, path: &Path, error: &DecodeError);
}

/// 统计关键字在文本中不重叠出现的次数
///
/// 从左到右扫描, 每次匹配消耗其所占区间。空关键字在每个字符边界匹配一次,
/// 即 `字符数 + 1`。
pub fn count_occurrences(content: &str, keyword: &str) -> u64 {
    content.matches(keyword).count() as u64
}

/// 取文件扩展名: 小写, 不含点; 没有扩展名时为空串
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// 关键字计数器
pub struct MatchCounter<'a> {
    registry: &'a DecoderRegistry,
    keyword: String,
    case_sensitive: bool,
    extensions: ExtensionFilter,
}

impl<'a> MatchCounter<'a> {
    /// 创建计数器; 大小写不敏感时关键字只在这里转换一次
    pub fn new(registry: &'a DecoderRegistry, request: &SearchRequest) -> Self {
        let keyword = if request.case_sensitive() {
            request.keyword().to_string()
        } else {
            request.keyword().to_lowercase()
        };

        Self {
            registry,
            keyword,
            case_sensitive: request.case_sensitive(),
            extensions: request.extensions().clone(),
        }
    }

    /// 统计一段已解码文本中的命中次数
    pub fn count(&self, content: &str) -> u64 {
        if self.case_sensitive {
            count_occurrences(content, &self.keyword)
        } else {
            count_occurrences(&content.to_lowercase(), &self.keyword)
        }
    }

    /// 依次处理每个路径, 单个文件的失败只通知观察者, 不会中断扫描
    pub fn scan<I>(&self, paths: I, observer: &mut dyn ScanObserver) -> ScanSummary
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut summary = ScanSummary::default();

        for path in paths {
            let path = path.as_ref();
            let extension = file_extension(path);

            if !self.extensions.allows(&extension) {
                observer.file_skipped(path, SkipReason::Filtered);
                continue;
            }

            let Some(decoder) = self.registry.get(&extension) else {
                observer.file_skipped(path, SkipReason::Unsupported);
                continue;
            };

            summary.files_scanned += 1;
            let content = match decoder.decode(path) {
                Ok(content) => content,
                Err(err) => {
                    summary.files_failed += 1;
                    observer.decode_failed(path, &err);
                    continue;
                }
            };

            let count = self.count(&content);
            observer.file_decoded(path, count);
            if count == 0 {
                continue;
            }

            let result = MatchResult {
                file_path: path.to_string_lossy().into_owned(),
                extension,
                count,
            };
            observer.match_found(&result);
            summary.total_matches += count;
            summary.results.push(result);
        }

        summary
    }
}

/// 遍历请求的根目录并统计每个文件的命中次数
pub fn search_directory(
    request: &SearchRequest,
    registry: &DecoderRegistry,
    filter: FileFilter,
    logger: &dyn LoggerTrait,
    observer: &mut dyn ScanObserver,
) -> ScanSummary {
    let walker =
        FileWalker::new(request.root_directory(), request.recursive()).with_filter(filter);
    MatchCounter::new(registry, request).scan(walker.walk(logger), observer)
}
