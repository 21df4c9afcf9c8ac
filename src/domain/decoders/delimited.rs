use std::path::Path;

use csv::{ErrorKind, ReaderBuilder};

use super::{DecodeError, Decoder};

/// CSV: 字段以 `\t` 连接, 行以 `\n` 连接, 允许行宽不一致
pub struct CsvDecoder;

impl Decoder for CsvDecoder {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().collect::<Vec<_>>().join("\t"));
        }

        Ok(rows.join("\n"))
    }
}

fn csv_error(err: csv::Error) -> DecodeError {
    match err.into_kind() {
        ErrorKind::Io(io) => DecodeError::Io(io),
        ErrorKind::Utf8 { err, .. } => DecodeError::Encoding(err.to_string()),
        other => DecodeError::malformed("csv", format!("{other:?}")),
    }
}
