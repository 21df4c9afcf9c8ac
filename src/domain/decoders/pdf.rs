use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::{DecodeError, Decoder};

/// PDF 文本提取
///
/// 按页顺序拼接, 没有文本的页不产生任何内容。
pub struct PdfDecoder;

impl Decoder for PdfDecoder {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let bytes = std::fs::read(path)?;

        // pdf-extract 遇到损坏的文档可能 panic, 这里隔离为单文件错误
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&bytes)
        }));

        match extracted {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(DecodeError::malformed("pdf", err)),
            Err(_) => Err(DecodeError::malformed("pdf", "parser panicked")),
        }
    }
}
