use std::path::Path;

use super::{DecodeError, Decoder};

/// 纯文本 (txt, md, log, env)
///
/// 按 UTF-8 解码, 非法字节替换为 U+FFFD 而不是报错。
pub struct PlainTextDecoder;

impl Decoder for PlainTextDecoder {
    fn name(&self) -> &'static str {
        "text"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lossy_decoding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"cat \xff\xfe dog").unwrap();

        let text = PlainTextDecoder.decode(&path).unwrap();
        assert!(text.starts_with("cat "));
        assert!(text.ends_with(" dog"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = PlainTextDecoder
            .decode(&dir.path().join("absent.txt"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
