//! 结构化格式: 先解析为结构化值, 再序列化为规范文本, 搜索作用于规范文本
//! 而不是原始字节。

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ini::Ini;
use quick_xml::escape::partial_escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use super::{DecodeError, Decoder};

/// JSON, 重新序列化为紧凑形式
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let reader = BufReader::new(File::open(path)?);
        let value: serde_json::Value = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                DecodeError::Io(e.into())
            } else {
                DecodeError::malformed("json", e)
            }
        })?;

        serde_json::to_string(&value).map_err(|e| DecodeError::malformed("json", e))
    }
}

/// XML, 解析后重新输出元素树
///
/// 去掉 XML 声明, 注释, 处理指令和 DOCTYPE; 要求恰好一个根元素。
/// 按声明的编码解码, 字符引用和实体展开为字符, CDATA 作为普通文本输出。
pub struct XmlDecoder;

impl Decoder for XmlDecoder {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let bytes = std::fs::read(path)?;
        normalize_xml(&bytes)
    }
}

fn xml_error(err: quick_xml::Error) -> DecodeError {
    match err {
        quick_xml::Error::NonDecodable(e) => DecodeError::Encoding(match e {
            Some(utf8) => utf8.to_string(),
            None => "text is not valid in the declared encoding".to_string(),
        }),
        other => DecodeError::malformed("xml", other),
    }
}

fn normalize_xml(xml: &[u8]) -> Result<String, DecodeError> {
    let malformed = |message: &str| DecodeError::malformed("xml", message);

    // 从字节读取, 才会根据 BOM 和 encoding 声明切换解码器
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut root_seen = false;

    loop {
        let normalized = match reader.read_event().map_err(xml_error)? {
            Event::Start(_) | Event::Empty(_) if depth == 0 && root_seen => {
                return Err(malformed("junk after document element"));
            }
            Event::Start(e) => {
                depth += 1;
                root_seen = true;
                Event::Start(element(&reader, &e)?)
            }
            Event::Empty(e) => {
                root_seen = true;
                Event::Empty(element(&reader, &e)?)
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                let name = reader
                    .decoder()
                    .decode(e.name().as_ref())
                    .map_err(xml_error)?
                    .into_owned();
                Event::End(BytesEnd::new(name))
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(xml_error)?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(malformed("text outside of the root element"));
                    }
                    continue;
                }
                Event::Text(BytesText::from_escaped(partial_escape(&text).into_owned()))
            }
            Event::CData(c) => {
                let text = reader.decoder().decode(&c).map_err(xml_error)?;
                Event::Text(BytesText::from_escaped(partial_escape(&text).into_owned()))
            }
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => continue,
            Event::Eof => break,
        };
        writer
            .write_event(normalized)
            .map_err(|e| DecodeError::malformed("xml", e))?;
    }

    if !root_seen {
        return Err(malformed("no root element"));
    }
    if depth != 0 {
        return Err(malformed("unclosed element"));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| DecodeError::Encoding(e.to_string()))
}

/// 用解码后的名字和属性值重建元素, 属性值统一使用双引号
fn element(
    reader: &Reader<&[u8]>,
    start: &BytesStart,
) -> Result<BytesStart<'static>, DecodeError> {
    let decoder = reader.decoder();
    let name = decoder
        .decode(start.name().as_ref())
        .map_err(xml_error)?
        .into_owned();
    let mut element = BytesStart::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| DecodeError::malformed("xml", e))?;
        let key = decoder.decode(attr.key.as_ref()).map_err(xml_error)?.into_owned();
        let value = attr.decode_and_unescape_value(reader).map_err(xml_error)?;
        let escaped = partial_escape(&value).replace('"', "&quot;");
        element.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escaped.into_bytes()),
        });
    }

    Ok(element)
}

/// YAML, 解析后重新序列化
pub struct YamlDecoder;

impl Decoder for YamlDecoder {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let reader = BufReader::new(File::open(path)?);
        let value: serde_yaml::Value =
            serde_yaml::from_reader(reader).map_err(|e| DecodeError::malformed("yaml", e))?;

        serde_yaml::to_string(&value).map_err(|e| DecodeError::malformed("yaml", e))
    }
}

/// INI, 解析节与键值后重新写出
pub struct IniDecoder;

impl Decoder for IniDecoder {
    fn name(&self) -> &'static str {
        "ini"
    }

    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let config = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => DecodeError::Io(io),
            ini::Error::Parse(parse) => DecodeError::malformed("ini", parse),
        })?;

        let mut buffer = Vec::new();
        config.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| DecodeError::Encoding(e.to_string()))
    }
}
