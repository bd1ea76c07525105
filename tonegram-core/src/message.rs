//! The transmitted message envelope: header, content and footer.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A minimal JSON value tree used for the header field.
///
/// A tagged sum rather than `serde_json::Value` so that object field order
/// is always the `BTreeMap`'s sorted order: encoding the same header twice
/// always produces the same header bitstream, regardless of the order keys
/// were inserted in.
#[derive(Debug, Clone, PartialEq)]
pub enum Json {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Object(BTreeMap<String, Json>),
}

impl Json {
    pub fn empty_object() -> Self {
        Json::Object(BTreeMap::new())
    }

    /// Canonical JSON text for this value: object keys in sorted order, no
    /// insignificant whitespace.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            Json::Null => out.push_str("null"),
            Json::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Json::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    out.push_str(&format!("{}", *n as i64));
                } else {
                    out.push_str(&n.to_string());
                }
            }
            Json::String(s) => out.push_str(&escape_json_string(s)),
            Json::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
            Json::Object(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&escape_json_string(key));
                    out.push(':');
                    value.write_canonical(out);
                }
                out.push('}');
            }
        }
    }

    /// Parse JSON text into a `Json` tree.
    pub fn parse(text: &str) -> Result<Self, JsonParseError> {
        let mut parser = JsonParser {
            chars: text.chars().collect(),
            pos: 0,
        };
        parser.skip_whitespace();
        let value = parser.parse_value()?;
        parser.skip_whitespace();
        if parser.pos != parser.chars.len() {
            return Err(JsonParseError::TrailingData);
        }
        Ok(value)
    }
}

fn escape_json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonParseError {
    UnexpectedEnd,
    UnexpectedChar(char),
    TrailingData,
    InvalidNumber,
    InvalidEscape(char),
}

impl fmt::Display for JsonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonParseError::UnexpectedEnd => write!(f, "unexpected end of input"),
            JsonParseError::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            JsonParseError::TrailingData => write!(f, "trailing data after JSON value"),
            JsonParseError::InvalidNumber => write!(f, "invalid number literal"),
            JsonParseError::InvalidEscape(c) => write!(f, "invalid escape sequence '\\{c}'"),
        }
    }
}

impl std::error::Error for JsonParseError {}

struct JsonParser {
    chars: Vec<char>,
    pos: usize,
}

impl JsonParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, c: char) -> Result<(), JsonParseError> {
        match self.advance() {
            Some(found) if found == c => Ok(()),
            Some(found) => Err(JsonParseError::UnexpectedChar(found)),
            None => Err(JsonParseError::UnexpectedEnd),
        }
    }

    fn parse_value(&mut self) -> Result<Json, JsonParseError> {
        self.skip_whitespace();
        match self.peek().ok_or(JsonParseError::UnexpectedEnd)? {
            '{' => self.parse_object(),
            '[' => self.parse_array(),
            '"' => Ok(Json::String(self.parse_string()?)),
            't' => self.parse_literal("true", Json::Bool(true)),
            'f' => self.parse_literal("false", Json::Bool(false)),
            'n' => self.parse_literal("null", Json::Null),
            '-' | '0'..='9' => self.parse_number(),
            c => Err(JsonParseError::UnexpectedChar(c)),
        }
    }

    fn parse_literal(&mut self, literal: &str, value: Json) -> Result<Json, JsonParseError> {
        for expected in literal.chars() {
            self.expect(expected)?;
        }
        Ok(value)
    }

    fn parse_object(&mut self) -> Result<Json, JsonParseError> {
        self.expect('{')?;
        let mut map = BTreeMap::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.advance();
            return Ok(Json::Object(map));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some('}') => break,
                Some(c) => return Err(JsonParseError::UnexpectedChar(c)),
                None => return Err(JsonParseError::UnexpectedEnd),
            }
        }
        Ok(Json::Object(map))
    }

    fn parse_array(&mut self) -> Result<Json, JsonParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.advance();
            return Ok(Json::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some(']') => break,
                Some(c) => return Err(JsonParseError::UnexpectedChar(c)),
                None => return Err(JsonParseError::UnexpectedEnd),
            }
        }
        Ok(Json::Array(items))
    }

    fn parse_string(&mut self) -> Result<String, JsonParseError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.advance().ok_or(JsonParseError::UnexpectedEnd)? {
                '"' => break,
                '\\' => match self.advance().ok_or(JsonParseError::UnexpectedEnd)? {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    '/' => out.push('/'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            let digit = self.advance().ok_or(JsonParseError::UnexpectedEnd)?;
                            code = code * 16
                                + digit
                                    .to_digit(16)
                                    .ok_or(JsonParseError::InvalidEscape('u'))?;
                        }
                        out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    other => return Err(JsonParseError::InvalidEscape(other)),
                },
                c => out.push(c),
            }
        }
        Ok(out)
    }

    fn parse_number(&mut self) -> Result<Json, JsonParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Json::Number)
            .map_err(|_| JsonParseError::InvalidNumber)
    }
}

impl Serialize for Json {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Json::Null => serializer.serialize_unit(),
            Json::Bool(b) => serializer.serialize_bool(*b),
            Json::Number(n) => serializer.serialize_f64(*n),
            Json::String(s) => serializer.serialize_str(s),
            Json::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Json::Object(map) => {
                let mut ser_map = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    ser_map.serialize_entry(k, v)?;
                }
                ser_map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Json {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(JsonVisitor)
    }
}

struct JsonVisitor;

impl<'de> Visitor<'de> for JsonVisitor {
    type Value = Json;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E>(self) -> Result<Json, E> {
        Ok(Json::Null)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Json, E> {
        Ok(Json::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Json, E> {
        Ok(Json::Number(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Json, E> {
        Ok(Json::Number(v as f64))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Json, E> {
        Ok(Json::Number(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Json, E> {
        Ok(Json::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Json, E> {
        Ok(Json::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Json, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Json::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Json, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut out = BTreeMap::new();
        while let Some((k, v)) = map.next_entry()? {
            out.insert(k, v);
        }
        Ok(Json::Object(out))
    }
}

/// The three-section message transmitted over the air: a JSON header, a raw
/// content byte string and a footer of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub header: Json,
    pub content: Vec<u8>,
    pub footer: String,
}

impl Message {
    pub fn new(header: Json, content: Vec<u8>, footer: impl Into<String>) -> Self {
        Self {
            header,
            content,
            footer: footer.into(),
        }
    }

    /// Build a message whose header carries the conventional file-transfer
    /// fields (`file_name`, `file_size`, `file_type`, `content_base`, plus
    /// caller-supplied `metadata`) instead of an arbitrary `Json` value.
    ///
    /// This is a convenience on top of [`Message::new`]: the codec itself
    /// transmits whatever header is handed to it, but callers moving files
    /// across the link want the header to describe the payload rather than
    /// compose the object by hand each time.
    pub fn compose_file(
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        content: Vec<u8>,
        footer: impl Into<String>,
        metadata: Json,
    ) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("file_name".to_string(), Json::String(file_name.into()));
        fields.insert("file_size".to_string(), Json::Number(content.len() as f64));
        fields.insert("file_type".to_string(), Json::String(file_type.into()));
        fields.insert("content_base".to_string(), Json::String("base64".to_string()));
        fields.insert("metadata".to_string(), metadata);
        Self {
            header: Json::Object(fields),
            content,
            footer: footer.into(),
        }
    }
}

/// On-disk/wire envelope: `{"header": <object>, "content": "<base64>", "footer": "<text>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub header: Json,
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,
    pub footer: String,
}

impl From<Message> for MessageEnvelope {
    fn from(message: Message) -> Self {
        Self {
            header: message.header,
            content: message.content,
            footer: message.footer,
        }
    }
}

impl From<MessageEnvelope> for Message {
    fn from(envelope: MessageEnvelope) -> Self {
        Self {
            header: envelope.header,
            content: envelope.content,
            footer: envelope.footer,
        }
    }
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const TABLE: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    pub fn encode(data: &[u8]) -> String {
        let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
        for chunk in data.chunks(3) {
            let b0 = chunk[0];
            let b1 = *chunk.get(1).unwrap_or(&0);
            let b2 = *chunk.get(2).unwrap_or(&0);
            let n = ((b0 as u32) << 16) | ((b1 as u32) << 8) | b2 as u32;
            out.push(TABLE[(n >> 18 & 0x3F) as usize] as char);
            out.push(TABLE[(n >> 12 & 0x3F) as usize] as char);
            out.push(if chunk.len() > 1 {
                TABLE[(n >> 6 & 0x3F) as usize] as char
            } else {
                '='
            });
            out.push(if chunk.len() > 2 {
                TABLE[(n & 0x3F) as usize] as char
            } else {
                '='
            });
        }
        out
    }

    pub fn decode(text: &str) -> Result<Vec<u8>, String> {
        fn value(c: u8) -> Option<u32> {
            TABLE.iter().position(|&t| t == c).map(|p| p as u32)
        }

        let cleaned: Vec<u8> = text.bytes().filter(|&b| b != b'=').collect();
        let mut out = Vec::with_capacity(cleaned.len() * 3 / 4);
        for chunk in cleaned.chunks(4) {
            let mut n = 0u32;
            for &c in chunk {
                n = (n << 6) | value(c).ok_or_else(|| format!("invalid base64 byte {c}"))?;
            }
            n <<= 6 * (4 - chunk.len() as u32);
            let bytes = [(n >> 16) as u8, (n >> 8) as u8, n as u8];
            out.extend_from_slice(&bytes[..chunk.len() - 1]);
        }
        Ok(out)
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_string_sorts_object_keys() {
        let mut map = BTreeMap::new();
        map.insert("zeta".to_string(), Json::Bool(true));
        map.insert("alpha".to_string(), Json::Number(1.0));
        let json = Json::Object(map);
        assert_eq!(json.to_canonical_string(), r#"{"alpha":1,"zeta":true}"#);
    }

    #[test]
    fn parse_roundtrips_through_canonical_string() {
        let text = r#"{"b": 2, "a": [1, 2.5, "x", null, true, false]}"#;
        let parsed = Json::parse(text).unwrap();
        assert_eq!(
            parsed.to_canonical_string(),
            r#"{"a":[1,2.5,"x",null,true,false],"b":2}"#
        );
    }

    #[test]
    fn parse_rejects_trailing_data() {
        assert_eq!(Json::parse("{} garbage"), Err(JsonParseError::TrailingData));
    }

    #[test]
    fn base64_roundtrips_arbitrary_bytes() {
        let data = vec![0u8, 1, 2, 250, 251, 252, 253, 254, 255];
        let encoded = base64_bytes::encode(&data);
        let decoded = base64_bytes::decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn base64_handles_non_multiple_of_three_lengths() {
        for len in 0..12 {
            let data: Vec<u8> = (0..len).collect();
            let encoded = base64_bytes::encode(&data);
            assert_eq!(base64_bytes::decode(&encoded).unwrap(), data);
        }
    }

    #[test]
    fn envelope_roundtrips_through_message() {
        let message = Message::new(Json::empty_object(), vec![1, 2, 3], "end");
        let envelope: MessageEnvelope = message.clone().into();
        let restored: Message = envelope.into();
        assert_eq!(restored, message);
    }

    #[test]
    fn compose_file_populates_conventional_header_fields() {
        let content = vec![1, 2, 3, 4];
        let message = Message::compose_file(
            "report.txt",
            "text/plain",
            content.clone(),
            "done",
            Json::empty_object(),
        );
        let Json::Object(fields) = &message.header else {
            panic!("expected an object header");
        };
        assert_eq!(fields["file_name"], Json::String("report.txt".to_string()));
        assert_eq!(fields["file_size"], Json::Number(content.len() as f64));
        assert_eq!(fields["file_type"], Json::String("text/plain".to_string()));
        assert_eq!(fields["content_base"], Json::String("base64".to_string()));
        assert_eq!(message.content, content);
        assert_eq!(message.footer, "done");
    }
}
