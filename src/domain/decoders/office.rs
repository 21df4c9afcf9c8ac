use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook, Data, Reader as _, Xlsx, XlsxError};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{DecodeError, Decoder};

const DOCX_BODY: &str = "word/document.xml";

/// Word 文档 (docx)
///
/// 每个段落 (`w:p`, 含表格内段落) 一行, 段落之间以 `\n` 分隔。
pub struct DocxDecoder;

impl Decoder for DocxDecoder {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(zip_error)?;
        let mut body = String::new();
        archive
            .by_name(DOCX_BODY)
            .map_err(zip_error)?
            .read_to_string(&mut body)?;

        Ok(paragraphs(&body)?.join("\n"))
    }
}

fn zip_error(err: ZipError) -> DecodeError {
    match err {
        ZipError::Io(io) => DecodeError::Io(io),
        other => DecodeError::malformed("docx", other),
    }
}

/// 按文档顺序提取段落文本
///
/// 文本框 (`w:txbxContent`) 中的段落嵌套在外层段落里, 各自成为独立段落,
/// 位置按起始标签的顺序排列。
fn paragraphs(xml: &str) -> Result<Vec<String>, DecodeError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    // 仍未结束的段落在 paragraphs 中的下标, 最内层在最后
    let mut open: Vec<usize> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| DecodeError::malformed("docx", e))?
        {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    open.push(paragraphs.len());
                    paragraphs.push(String::new());
                }
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    open.pop();
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => {
                let current = open.last().copied();
                match (e.name().as_ref(), current) {
                    (b"w:p", _) => paragraphs.push(String::new()),
                    (b"w:tab", Some(i)) if run_depth > 0 => paragraphs[i].push('\t'),
                    (b"w:br" | b"w:cr", Some(i)) if run_depth > 0 => paragraphs[i].push('\n'),
                    _ => {}
                }
            }
            Event::Text(t) if in_text => {
                if let Some(&i) = open.last() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| DecodeError::malformed("docx", e))?;
                    paragraphs[i].push_str(&unescaped);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Excel 工作簿 (xlsx)
///
/// 依次遍历每个工作表的每一行每个单元格, 非空单元格的文本以 `\n` 连接。
pub struct XlsxDecoder;

impl Decoder for XlsxDecoder {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let mut workbook: Xlsx<_> = open_workbook(path).map_err(xlsx_error)?;
        let mut cells = Vec::new();

        for sheet in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet).map_err(xlsx_error)?;
            for row in range.rows() {
                cells.extend(
                    row.iter()
                        .filter(|cell| !matches!(cell, Data::Empty))
                        .map(|cell| cell.to_string()),
                );
            }
        }

        Ok(cells.join("\n"))
    }
}

fn xlsx_error(err: XlsxError) -> DecodeError {
    match err {
        XlsxError::Io(io) => DecodeError::Io(io),
        other => DecodeError::malformed("xlsx", other),
    }
}
