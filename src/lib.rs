//! 在目录中搜索关键字, 支持纯文本, PDF, Office 文档和常见结构化格式。
//!
//! 四层结构:
//! - `domain`: 搜索请求, 目录遍历, 解码器注册表, 计数
//! - `application`: 配置
//! - `infrastructure`: 调试日志与错误日志
//! - `presentation`: 控制台输出与 CSV 报告

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// 重新导出主要类型
pub use application::Config;
pub use domain::{
    search_directory, DecodeError, Decoder, DecoderRegistry, ExtensionFilter, MatchResult,
    ScanSummary, SearchRequest,
};
pub use infrastructure::{ErrorLogger, Logger, LoggerTrait};
pub use presentation::{write_csv, ConsoleReporter};
