use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Local;

use crate::domain::{DecodeError, ErrorType};

/// 错误日志记录器
///
/// 无论是否启用都会按 [`ErrorType`] 计数, 启用时额外写入 `error_<时间戳>.log`。
pub struct ErrorLogger {
    error_file: Arc<Mutex<Option<File>>>,
    error_path: PathBuf,
    enabled: bool,
    error_counts: Arc<Mutex<BTreeMap<ErrorType, usize>>>,
}

impl ErrorLogger {
    /// 创建新的错误日志记录器
    pub fn new(enabled: bool, log_dir: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self {
                error_file: Arc::new(Mutex::new(None)),
                error_path: PathBuf::new(),
                enabled: false,
                error_counts: Arc::new(Mutex::new(BTreeMap::new())),
            });
        }

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");
        let error_path = log_dir.join(format!("error_{}.log", timestamp));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&error_path)?;

        // 写入UTF-8 BOM以确保文件被正确识别为UTF-8
        let mut file_clone = file.try_clone()?;
        file_clone.write_all(&[0xEF, 0xBB, 0xBF])?;

        writeln!(file_clone, "# word-finder error log")?;
        writeln!(file_clone, "# started: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file_clone, "# ============================================")?;
        writeln!(file_clone)?;

        Ok(Self {
            error_file: Arc::new(Mutex::new(Some(file))),
            error_path,
            enabled: true,
            error_counts: Arc::new(Mutex::new(BTreeMap::new())),
        })
    }

    /// 记录单个文件的解码失败
    pub fn log_decode_error(&self, path: &Path, error: &DecodeError) -> Result<()> {
        self.log_error(
            error.error_type(),
            Some(&path.to_string_lossy()),
            &error.to_string(),
            None,
        )
    }

    /// 记录错误
    pub fn log_error(
        &self,
        error_type: ErrorType,
        file_path: Option<&str>,
        message: &str,
        details: Option<&str>,
    ) -> Result<()> {
        if let Ok(mut counts) = self.error_counts.lock() {
            *counts.entry(error_type).or_insert(0) += 1;
        }

        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "[{}] {} - {}", timestamp, error_type.as_str(), message)?;

                if let Some(path) = file_path {
                    writeln!(file, "  file: {}", path)?;
                }

                if let Some(detail) = details {
                    writeln!(file, "  details: {}", detail)?;
                }

                writeln!(file)?;
                file.flush()?;
            }
        }

        Ok(())
    }

    /// 获取错误统计信息
    pub fn get_error_summary(&self) -> BTreeMap<ErrorType, usize> {
        self.error_counts
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    /// 获取总错误数
    pub fn get_total_errors(&self) -> usize {
        self.get_error_summary().values().sum()
    }

    pub fn has_errors(&self) -> bool {
        self.get_total_errors() > 0
    }

    pub fn error_path(&self) -> &Path {
        &self.error_path
    }

    /// 完成错误日志记录
    pub fn finalize(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let summary = self.get_error_summary();
        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "# ============================================")?;
                writeln!(file, "# finished: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;

                if summary.is_empty() {
                    writeln!(file, "# no errors")?;
                } else {
                    writeln!(file, "# errors by type:")?;
                    for (error_type, count) in &summary {
                        writeln!(file, "#   {}: {}", error_type.as_str(), count)?;
                    }
                    writeln!(file, "#   total: {}", summary.values().sum::<usize>())?;
                }

                file.flush()?;
            }
        }

        Ok(())
    }

    /// 把错误摘要写到 `out` (通常是 stderr); 没有错误时什么也不写
    pub fn write_error_summary(&self, out: &mut dyn Write) -> Result<()> {
        if !self.has_errors() {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "Some files could not be read:")?;
        for (error_type, count) in &self.get_error_summary() {
            writeln!(out, "  {}: {}", error_type.as_str(), count)?;
        }
        writeln!(out, "  total: {}", self.get_total_errors())?;
        if self.enabled {
            writeln!(out, "  details: {}", self.error_path.display())?;
        }

        Ok(())
    }
}
