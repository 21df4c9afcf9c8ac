//! 文档解码器注册表
//!
//! 按扩展名(小写, 不含点)把文件交给对应的解码器, 解码器只负责把文件
//! 转换成一段可搜索的文本。注册表在构建完成后只读。

mod delimited;
mod office;
mod pdf;
mod structured;
mod text;

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

pub use delimited::CsvDecoder;
pub use office::{DocxDecoder, XlsxDecoder};
pub use pdf::PdfDecoder;
pub use structured::{IniDecoder, JsonDecoder, XmlDecoder, YamlDecoder};
pub use text::PlainTextDecoder;

/// 错误类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorType {
    /// 文件读取错误
    FileRead,
    /// 文本编码错误
    Encoding,
    /// 文档结构错误
    Malformed,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::FileRead => "file read",
            ErrorType::Encoding => "encoding",
            ErrorType::Malformed => "malformed document",
        }
    }
}

/// 单个文件解码失败的原因
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid text encoding: {0}")]
    Encoding(String),

    #[error("malformed {format} document: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },
}

impl DecodeError {
    pub fn malformed(format: &'static str, err: impl Display) -> Self {
        DecodeError::Malformed {
            format,
            message: err.to_string(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            DecodeError::Io(_) => ErrorType::FileRead,
            DecodeError::Encoding(_) => ErrorType::Encoding,
            DecodeError::Malformed { .. } => ErrorType::Malformed,
        }
    }
}

/// 解码器: 把一个文件转换成可搜索文本, 不持有任何状态
pub trait Decoder: Send + Sync {
    /// 格式名称, 用于日志
    fn name(&self) -> &'static str;

    fn decode(&self, path: &Path) -> Result<String, DecodeError>;
}

/// 扩展名 -> 解码器 的映射表
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<dyn Decoder>>,
}

impl DecoderRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含全部内置格式的注册表
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let plain: Arc<dyn Decoder> = Arc::new(PlainTextDecoder);
        for ext in ["txt", "md", "log", "env"] {
            registry.register_shared(ext, Arc::clone(&plain));
        }

        let yaml: Arc<dyn Decoder> = Arc::new(YamlDecoder);
        registry.register_shared("yaml", Arc::clone(&yaml));
        registry.register_shared("yml", yaml);

        registry.register("pdf", PdfDecoder);
        registry.register("docx", DocxDecoder);
        registry.register("xlsx", XlsxDecoder);
        registry.register("csv", CsvDecoder);
        registry.register("json", JsonDecoder);
        registry.register("xml", XmlDecoder);
        registry.register("ini", IniDecoder);
        registry
    }

    /// 注册解码器, 已存在的扩展名会被覆盖
    pub fn register<D: Decoder + 'static>(&mut self, extension: &str, decoder: D) {
        self.register_shared(extension, Arc::new(decoder));
    }

    pub fn register_shared(&mut self, extension: &str, decoder: Arc<dyn Decoder>) {
        self.decoders.insert(normalize_extension(extension), decoder);
    }

    /// 查找解码器; 未注册的格式返回 None
    pub fn get(&self, extension: &str) -> Option<&dyn Decoder> {
        self.decoders.get(extension).map(|d| d.as_ref())
    }

    pub fn is_supported(&self, extension: &str) -> bool {
        self.decoders.contains_key(extension)
    }

    /// 已注册的扩展名, 按字母排序
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

/// 扩展名规范化: 去空白, 去前导点, 转小写
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
