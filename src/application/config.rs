use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{ExtensionFilter, FileFilter};

/// 单个文件大小上限的最大允许值 (1 TiB)
const MAX_FILE_SIZE_LIMIT: u64 = 1 << 40;

/// 应用程序配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 搜索相关配置
    pub search: SearchConfig,
    /// 排除规则配置
    pub exclude: ExcludeConfig,
    /// 文件大小限制
    pub limits: LimitsConfig,
}

/// 搜索配置, 命令行参数优先
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 逗号分隔的扩展名, `*` 表示全部
    pub extensions: String,
    pub case_sensitive: bool,
    pub recursive: bool,
}

/// 排除规则配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcludeConfig {
    /// 不进入的目录名
    pub dirs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// 字节数, 0 表示不限制
    pub max_file_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            extensions: "*".to_string(),
            case_sensitive: false,
            recursive: false,
        }
    }
}

impl Config {
    /// 从配置文件加载配置，如果文件不存在则创建默认配置文件
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            let config = Self::default();
            config.save_to_file(config_path)?;
            eprintln!("Created default config file: {}", config_path.display());
            Ok(config)
        }
    }

    /// 从文件加载配置
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("failed to serialize config")?;

        fs::write(config_path, content)
            .with_context(|| format!("failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.search.extensions.trim().is_empty() {
            anyhow::bail!("search.extensions must not be empty (use \"*\" for all formats)");
        }

        if let Some(dir) = self
            .exclude
            .dirs
            .iter()
            .find(|d| d.is_empty() || d.contains('/') || d.contains('\\'))
        {
            anyhow::bail!("exclude.dirs entries must be plain directory names, got {:?}", dir);
        }

        if self.limits.max_file_size > MAX_FILE_SIZE_LIMIT {
            anyhow::bail!("limits.max_file_size cannot exceed 1 TiB");
        }

        Ok(())
    }

    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::parse(&self.search.extensions)
    }

    pub fn file_filter(&self) -> FileFilter {
        let max_size = match self.limits.max_file_size {
            0 => None,
            n => Some(n),
        };
        FileFilter::new(max_size, self.exclude.dirs.clone())
    }
}
