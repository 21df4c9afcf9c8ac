use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::domain::MatchResult;

/// CSV 表头
pub const CSV_HEADER: [&str; 3] = ["file", "extension", "count"];

/// 把结果写成 CSV, 覆盖已存在的文件
///
/// 表头总是写入, 即使没有任何结果; 行顺序与结果顺序一致。
pub fn write_csv(output: &Path, results: &[MatchResult]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(output)
        .with_context(|| format!("failed to create CSV file: {}", output.display()))?;

    writer.write_record(CSV_HEADER)?;
    for result in results {
        writer
            .serialize(result)
            .with_context(|| format!("failed to write CSV row for {}", result.file_path))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush CSV file: {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;
    use tempfile::tempdir;

    fn results() -> Vec<MatchResult> {
        vec![
            MatchResult {
                file_path: "pets/a.txt".to_string(),
                extension: "txt".to_string(),
                count: 2,
            },
            MatchResult {
                file_path: "pets/b, \"quoted\".md".to_string(),
                extension: "md".to_string(),
                count: 1,
            },
        ]
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("report.csv");
        let expected = results();

        write_csv(&output, &expected).unwrap();

        let mut reader = ReaderBuilder::new().from_path(&output).unwrap();
        assert_eq!(reader.headers().unwrap(), &csv::StringRecord::from(CSV_HEADER.to_vec()));

        let rows: Vec<MatchResult> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_csv_header_only_and_overwrite() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("report.csv");
        std::fs::write(&output, "stale content\nfrom an earlier run\n").unwrap();

        write_csv(&output, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "file,extension,count\n");
    }

    #[test]
    fn test_csv_rows_as_strings() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("report.csv");
        write_csv(&output, &results()[..1]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "file,extension,count\npets/a.txt,txt,2\n"
        );
    }
}
