use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use word_finder::application::Config;
use word_finder::domain::{search_directory, DecoderRegistry, ExtensionFilter, SearchRequest};
use word_finder::infrastructure::{ErrorLogger, Logger, LoggerTrait};
use word_finder::presentation::{
    format_csv_written, format_search_header, format_total, spinner, write_csv, ConsoleReporter,
};

/// 在目录中的文件里搜索关键字
#[derive(Parser, Debug)]
#[clap(author, version, about = "Search files in a directory for a given word.", long_about = None)]
struct Args {
    /// 要搜索的关键字
    #[clap(short = 'w', long = "word")]
    keyword: String,

    /// 要搜索的目录
    #[clap(short, long)]
    directory: PathBuf,

    /// 逗号分隔的扩展名, 例如 "pdf,txt"; 默认 "*" 表示所有支持的格式
    #[clap(short, long)]
    extensions: Option<String>,

    /// 区分大小写
    #[clap(short, long)]
    case_sensitive: bool,

    /// 递归扫描子目录
    #[clap(short, long)]
    recursive: bool,

    /// 将结果写入 CSV 文件
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// 配置文件路径 (TOML), 不存在时创建默认配置
    #[clap(long)]
    config: Option<PathBuf>,

    /// 在当前目录写入调试日志和错误日志
    #[clap(long)]
    log: bool,

    /// 在 stderr 显示进度
    #[clap(long)]
    progress: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    // 目录无效时直接退出, 不读写配置, 不开始扫描
    let request = SearchRequest::new(args.keyword, args.directory)?;

    let config = match &args.config {
        Some(path) => Config::load_or_create(path)?,
        None => Config::default(),
    };
    config.validate().context("invalid configuration")?;

    let extensions = match &args.extensions {
        Some(list) => ExtensionFilter::parse(list),
        None => config.extension_filter(),
    };

    let request = request
        .with_extensions(extensions)
        .with_case_sensitive(args.case_sensitive || config.search.case_sensitive)
        .with_recursive(args.recursive || config.search.recursive)
        .with_output(args.output);

    let log_dir = std::env::current_dir().context("failed to get current directory")?;
    let logger = Logger::new(args.log, &log_dir)?;
    let error_logger = ErrorLogger::new(args.log, &log_dir)?;

    // 记录搜索参数到日志
    if logger.is_enabled() {
        logger.log_message(&format!("keyword: {}", request.keyword()))?;
        logger.log_message(&format!("directory: {}", request.root_directory().display()))?;
        logger.log_message(&format!("extensions: {}", request.extensions()))?;
        logger.log_message(&format!("case sensitive: {}", request.case_sensitive()))?;
        logger.log_message(&format!("recursive: {}", request.recursive()))?;
        if let Some(path) = &args.config {
            logger.log_message(&format!("config: {}", path.display()))?;
        }
    }

    let registry = DecoderRegistry::with_defaults();
    let mut reporter = ConsoleReporter::new(io::stdout(), io::stderr(), &logger, &error_logger);
    if args.progress {
        reporter = reporter.with_progress(spinner()?);
    }

    reporter.print_line(&format_search_header(&request))?;

    let start_time = Instant::now();
    let summary = search_directory(
        &request,
        &registry,
        config.file_filter(),
        &logger,
        &mut reporter,
    );
    reporter.finish()?;

    reporter.print_line(&format_total(summary.total_matches))?;

    if let Some(output) = request.output_path() {
        write_csv(output, &summary.results)?;
        reporter.print_line(&format_csv_written(output))?;
    }

    logger.finalize(&summary, start_time.elapsed())?;
    error_logger.finalize()?;
    error_logger.write_error_summary(&mut io::stderr())?;
    if logger.is_enabled() {
        eprintln!("Debug log written to {}", logger.log_path().display());
    }

    Ok(())
}
