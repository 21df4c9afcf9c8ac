use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::{DecodeError, MatchResult, ScanObserver, SearchRequest, SkipReason};
use crate::infrastructure::{ErrorLogger, LoggerTrait};

/// 搜索参数说明行
pub fn format_search_header(request: &SearchRequest) -> String {
    format!(
        "Searching for '{}' in {} for extensions: {}",
        request.keyword(),
        request.root_directory().display(),
        request.extensions()
    )
}

/// 单个文件的命中行
pub fn format_match(result: &MatchResult) -> String {
    format!("Found in: {} | {} occurrence(s)", result.file_path, result.count)
}

pub fn format_failure(path: &Path, error: &DecodeError) -> String {
    format!("Error reading file {}: {}", path.display(), error)
}

pub fn format_total(total_matches: u64) -> String {
    format!("Word found {} times.", total_matches)
}

pub fn format_csv_written(path: &Path) -> String {
    format!("Results written to {}", path.display())
}

/// 创建进度条 (输出到 stderr)
pub fn spinner() -> Result<ProgressBar> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    progress.set_message("0 files processed");
    Ok(progress)
}

/// 控制台输出
///
/// 命中行写到 `out`, 单文件错误写到 `err`, 同时转发给调试日志和错误日志。
pub struct ConsoleReporter<'a, W: Write, E: Write> {
    out: W,
    err: E,
    logger: &'a dyn LoggerTrait,
    error_logger: &'a ErrorLogger,
    progress: Option<ProgressBar>,
    processed: u64,
    /// 扫描过程中第一次写标准输出失败的错误, 由 `finish` 返回
    write_error: Option<io::Error>,
}

impl<'a, W: Write, E: Write> ConsoleReporter<'a, W, E> {
    pub fn new(out: W, err: E, logger: &'a dyn LoggerTrait, error_logger: &'a ErrorLogger) -> Self {
        Self {
            out,
            err,
            logger,
            error_logger,
            progress: None,
            processed: 0,
            write_error: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// 打印一行到标准输出, 进度条存在时先暂停它
    pub fn print_line(&mut self, line: &str) -> Result<()> {
        let out = &mut self.out;
        match &self.progress {
            Some(progress) => progress.suspend(|| writeln!(out, "{}", line))?,
            None => writeln!(out, "{}", line)?,
        }
        Ok(())
    }

    /// 结束进度条, 返回扫描过程中的输出错误
    pub fn finish(&mut self) -> Result<()> {
        if let Some(progress) = self.progress.take() {
            progress.finish_and_clear();
        }
        match self.write_error.take() {
            Some(err) => Err(anyhow::Error::new(err).context("failed to write search results")),
            None => Ok(()),
        }
    }

    fn tick(&mut self, path: &Path, status: &str) {
        self.processed += 1;
        if let Some(progress) = &self.progress {
            progress.set_message(format!("{} files processed", self.processed));
            progress.tick();
        }

        if self.logger.is_enabled() {
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            let _ = self.logger.log_file(path, size, status);
        }
    }
}

impl<W: Write, E: Write> ScanObserver for ConsoleReporter<'_, W, E> {
    fn file_skipped(&mut self, path: &Path, reason: SkipReason) {
        self.tick(path, reason.as_str());
    }

    fn file_decoded(&mut self, path: &Path, count: u64) {
        self.tick(path, &format!("decoded, {} match(es)", count));
    }

    fn match_found(&mut self, result: &MatchResult) {
        if self.write_error.is_some() {
            return;
        }

        let line = format_match(result);
        let out = &mut self.out;
        let written = match &self.progress {
            Some(progress) => progress.suspend(|| writeln!(out, "{}", line)),
            None => writeln!(out, "{}", line),
        };
        if let Err(err) = written {
            // 标准输出已不可用 (例如管道关闭), 停止进度条, 错误留给 finish
            if let Some(progress) = self.progress.take() {
                progress.abandon();
            }
            self.write_error = Some(err);
        }
    }

    fn decode_failed(&mut self, path: &Path, error: &DecodeError) {
        self.tick(path, "failed");
        let _ = self.error_logger.log_decode_error(path, error);

        let line = format_failure(path, error);
        let err = &mut self.err;
        match &self.progress {
            Some(progress) => {
                let _ = progress.suspend(|| writeln!(err, "{}", line));
            }
            None => {
                let _ = writeln!(err, "{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExtensionFilter;
    use crate::infrastructure::Logger;
    use tempfile::tempdir;

    #[test]
    fn test_line_formats() {
        let result = MatchResult {
            file_path: "docs/a.txt".to_string(),
            extension: "txt".to_string(),
            count: 2,
        };
        assert_eq!(format_match(&result), "Found in: docs/a.txt | 2 occurrence(s)");
        assert_eq!(format_total(3), "Word found 3 times.");
        assert_eq!(
            format_csv_written(Path::new("out.csv")),
            "Results written to out.csv"
        );
    }

    #[test]
    fn test_search_header() {
        let dir = tempdir().unwrap();
        let request = SearchRequest::new("cat", dir.path())
            .unwrap()
            .with_extensions(ExtensionFilter::parse("txt,md"));

        let header = format_search_header(&request);
        assert!(header.starts_with("Searching for 'cat' in "));
        assert!(header.ends_with("for extensions: md, txt"));
    }

    #[test]
    fn test_reporter_routes_matches_and_failures() {
        let dir = tempdir().unwrap();
        let logger = Logger::disabled();
        let error_logger = ErrorLogger::new(false, dir.path()).unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();

        {
            let mut reporter = ConsoleReporter::new(&mut out, &mut err, &logger, &error_logger);
            reporter.match_found(&MatchResult {
                file_path: "a.txt".to_string(),
                extension: "txt".to_string(),
                count: 1,
            });
            reporter.decode_failed(Path::new("bad.json"), &DecodeError::malformed("json", "eof"));
            reporter.file_skipped(Path::new("x.bin"), SkipReason::Unsupported);
            reporter.finish().unwrap();
        }

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Found in: a.txt | 1 occurrence(s)\n"
        );
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error reading file bad.json: malformed json document: eof\n"
        );
        assert_eq!(error_logger.get_total_errors(), 1);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stdout_failure_is_returned_by_finish() {
        let dir = tempdir().unwrap();
        let logger = Logger::disabled();
        let error_logger = ErrorLogger::new(false, dir.path()).unwrap();
        let mut reporter = ConsoleReporter::new(ClosedPipe, Vec::new(), &logger, &error_logger)
            .with_progress(ProgressBar::hidden());

        for count in 1..=2 {
            reporter.match_found(&MatchResult {
                file_path: "a.txt".to_string(),
                extension: "txt".to_string(),
                count,
            });
        }

        let err = reporter.finish().unwrap_err();
        assert!(err.to_string().contains("failed to write search results"));
        // 错误只返回一次
        assert!(reporter.finish().is_ok());
    }
}
