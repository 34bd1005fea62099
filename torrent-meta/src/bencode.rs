//! Bencode decoding (BEP-3), enough to read `.torrent` metainfo.

use std::collections::BTreeMap;

use crate::{Error, Result};

const MAX_DEPTH: usize = 64;

/// A bencoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dict(BTreeMap<Vec<u8>, Value>),
}

impl Value {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Dict(dict) => dict.get(key.as_bytes()),
            _ => None,
        }
    }
}

/// Decode a complete bencoded document. Trailing bytes are an error.
pub fn decode(buf: &[u8]) -> Result<Value> {
    let mut decoder = Decoder { buf, pos: 0 };
    let value = decoder.value(0)?;
    if decoder.pos != buf.len() {
        return Err(decoder.err("trailing data"));
    }
    Ok(value)
}

/// Raw bytes of the top level `info` dictionary, exactly as they appear in
/// the input. The info-hash is computed over this span, so it must not be
/// re-encoded.
pub fn info_span(buf: &[u8]) -> Result<&[u8]> {
    let mut decoder = Decoder { buf, pos: 0 };
    if decoder.peek()? != b'd' {
        return Err(decoder.err("torrent file is not a dictionary"));
    }
    decoder.pos += 1;
    while decoder.peek()? != b'e' {
        let key = decoder.bytes()?;
        let start = decoder.pos;
        decoder.value(1)?;
        if key == b"info" {
            if buf[start] != b'd' {
                return Err(Error::MissingInfo);
            }
            return Ok(&buf[start..decoder.pos]);
        }
    }
    Err(Error::MissingInfo)
}

struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn err(&self, reason: &'static str) -> Error {
        Error::Syntax {
            offset: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Result<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.err("unexpected end of input"))
    }

    fn value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(self.err("nesting too deep"));
        }
        match self.peek()? {
            b'i' => self.integer().map(Value::Integer),
            b'0'..=b'9' => self.bytes().map(|b| Value::Bytes(b.to_vec())),
            b'l' => {
                self.pos += 1;
                let mut list = Vec::new();
                while self.peek()? != b'e' {
                    list.push(self.value(depth + 1)?);
                }
                self.pos += 1;
                Ok(Value::List(list))
            }
            b'd' => {
                self.pos += 1;
                let mut dict = BTreeMap::new();
                while self.peek()? != b'e' {
                    let key = self.bytes()?.to_vec();
                    let value = self.value(depth + 1)?;
                    dict.insert(key, value);
                }
                self.pos += 1;
                Ok(Value::Dict(dict))
            }
            _ => Err(self.err("unexpected token")),
        }
    }

    /// `i<digits>e`
    fn integer(&mut self) -> Result<i64> {
        self.pos += 1;
        let end = self.find(b'e')?;
        let digits = std::str::from_utf8(&self.buf[self.pos..end])
            .map_err(|_| self.err("integer is not ascii"))?;
        let n = digits
            .parse::<i64>()
            .map_err(|_| self.err("invalid integer"))?;
        self.pos = end + 1;
        Ok(n)
    }

    /// `<len>:<bytes>`
    fn bytes(&mut self) -> Result<&'a [u8]> {
        if !self.peek()?.is_ascii_digit() {
            return Err(self.err("expected byte string"));
        }
        let colon = self.find(b':')?;
        let len = std::str::from_utf8(&self.buf[self.pos..colon])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| self.err("invalid string length"))?;
        let start = colon + 1;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| self.err("string runs past end of input"))?;
        self.pos = end;
        Ok(&self.buf[start..end])
    }

    fn find(&self, needle: u8) -> Result<usize> {
        self.buf[self.pos..]
            .iter()
            .position(|b| *b == needle)
            .map(|i| self.pos + i)
            .ok_or_else(|| self.err("unterminated token"))
    }
}
