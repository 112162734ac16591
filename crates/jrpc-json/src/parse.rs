//! Recursive-descent parser with exact consumption reporting
//!
//! The parser builds nodes directly into the document, linking each child
//! as soon as it is created so a failure at any point can be cleaned up by
//! deleting the root. Running out of input inside an otherwise valid prefix
//! is always reported as [`ParseFailure::UnexpectedEnd`] at the offset equal
//! to the input length; every other failure stops short of the end.

use crate::document::{Document, MAX_DEPTH};
use crate::error::{JsonError, JsonResult, ParseFailure};
use crate::node::{Kind, NodeId};
use crate::number::Number;

/// Outcome of [`Document::parse_stream`]
#[derive(Debug)]
pub struct StreamParse {
    /// Parsed root, or the reason parsing stopped
    pub result: JsonResult<NodeId>,
    /// Offset just past the parsed value, or where parsing stopped
    pub consumed: usize,
}

impl StreamParse {
    /// Check if the input held a valid prefix that simply ran out
    ///
    /// Callers reading from a stream should wait for more bytes and retry.
    pub fn is_incomplete(&self) -> bool {
        matches!(&self.result, Err(err) if err.is_unexpected_end())
    }
}

impl Document {
    /// Parse the first value in `input`, ignoring anything after it
    pub fn parse(&mut self, input: &[u8]) -> JsonResult<NodeId> {
        self.parse_stream(input).result
    }

    /// Parse the first value in `input`
    pub fn parse_str(&mut self, input: &str) -> JsonResult<NodeId> {
        self.parse(input.as_bytes())
    }

    /// Parse the first value in `input` and report how far parsing got
    ///
    /// On success `consumed` is the offset just past the value. On failure no
    /// nodes are left behind; `consumed` equals `input.len()` exactly when the
    /// input was a valid but unfinished prefix.
    pub fn parse_stream(&mut self, input: &[u8]) -> StreamParse {
        let mut cursor = Cursor { input, pos: 0 };
        cursor.skip_whitespace();

        let root = match self.create_null() {
            Ok(root) => root,
            Err(err) => {
                return StreamParse {
                    result: Err(err),
                    consumed: cursor.pos,
                };
            }
        };

        match self.parse_value(&mut cursor, root, 0) {
            Ok(()) => StreamParse {
                result: Ok(root),
                consumed: cursor.pos,
            },
            Err(err) => {
                self.delete(root);
                let consumed = err.parse_offset().unwrap_or(cursor.pos);
                StreamParse {
                    result: Err(err),
                    consumed,
                }
            }
        }
    }

    fn parse_value(&mut self, c: &mut Cursor<'_>, id: NodeId, depth: usize) -> JsonResult<()> {
        if depth > MAX_DEPTH {
            return Err(c.fail(ParseFailure::TooDeep));
        }
        let kind = match c.peek() {
            None => return Err(c.end()),
            Some(b'n') => {
                c.literal(b"null")?;
                Kind::Null
            }
            Some(b't') => {
                c.literal(b"true")?;
                Kind::True
            }
            Some(b'f') => {
                c.literal(b"false")?;
                Kind::False
            }
            Some(b'"') => {
                let text = c.string()?;
                self.set_text(id, text)?;
                Kind::String
            }
            Some(b'-' | b'0'..=b'9') => {
                let number = c.number()?;
                self.get_mut(id)?.number = number;
                Kind::Number
            }
            Some(b'[') => return self.parse_array(c, id, depth),
            Some(b'{') => return self.parse_object(c, id, depth),
            Some(byte) => return Err(c.fail(ParseFailure::UnexpectedByte(byte))),
        };
        self.get_mut(id)?.kind = kind;
        Ok(())
    }

    fn parse_array(&mut self, c: &mut Cursor<'_>, id: NodeId, depth: usize) -> JsonResult<()> {
        self.get_mut(id)?.kind = Kind::Array;
        c.pos += 1;
        c.skip_whitespace();
        match c.peek() {
            None => return Err(c.end()),
            Some(b']') => {
                c.pos += 1;
                return Ok(());
            }
            Some(_) => {}
        }

        let mut tail = None;
        loop {
            let child = self.create_null()?;
            self.link_after(id, tail, child)?;
            tail = Some(child);

            self.parse_value(c, child, depth + 1)?;
            c.skip_whitespace();
            if c.separator(b']')? {
                return Ok(());
            }
        }
    }

    fn parse_object(&mut self, c: &mut Cursor<'_>, id: NodeId, depth: usize) -> JsonResult<()> {
        self.get_mut(id)?.kind = Kind::Object;
        c.pos += 1;
        c.skip_whitespace();
        match c.peek() {
            None => return Err(c.end()),
            Some(b'}') => {
                c.pos += 1;
                return Ok(());
            }
            Some(_) => {}
        }

        let mut tail = None;
        loop {
            match c.peek() {
                None => return Err(c.end()),
                Some(b'"') => {}
                Some(_) => return Err(c.fail(ParseFailure::ExpectedKey)),
            }
            let key = c.string()?;

            let child = self.create_null()?;
            self.link_after(id, tail, child)?;
            tail = Some(child);
            self.set_name(child, key)?;

            c.skip_whitespace();
            match c.peek() {
                None => return Err(c.end()),
                Some(b':') => c.pos += 1,
                Some(_) => return Err(c.fail(ParseFailure::ExpectedColon)),
            }
            c.skip_whitespace();

            self.parse_value(c, child, depth + 1)?;
            c.skip_whitespace();
            if c.separator(b'}')? {
                return Ok(());
            }
        }
    }
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    fn fail(&self, reason: ParseFailure) -> JsonError {
        JsonError::Parse {
            offset: self.pos,
            reason,
        }
    }

    fn end(&self) -> JsonError {
        JsonError::Parse {
            offset: self.input.len(),
            reason: ParseFailure::UnexpectedEnd,
        }
    }

    /// Consume `,` (returns false) or `close` (returns true)
    fn separator(&mut self, close: u8) -> JsonResult<bool> {
        match self.peek() {
            None => Err(self.end()),
            Some(b',') => {
                self.pos += 1;
                self.skip_whitespace();
                match self.peek() {
                    None => Err(self.end()),
                    Some(byte) if byte == close => Err(self.fail(ParseFailure::TrailingComma)),
                    Some(_) => Ok(false),
                }
            }
            Some(byte) if byte == close => {
                self.pos += 1;
                Ok(true)
            }
            Some(_) => Err(self.fail(ParseFailure::ExpectedCommaOrClose)),
        }
    }

    fn literal(&mut self, word: &[u8]) -> JsonResult<()> {
        let rest = &self.input[self.pos..];
        let matched = rest.iter().zip(word).take_while(|(a, b)| a == b).count();
        if matched == word.len() {
            self.pos += matched;
            return Ok(());
        }
        if matched == rest.len() {
            // the input so far is a prefix of the keyword
            return Err(self.end());
        }
        self.pos += matched;
        Err(self.fail(ParseFailure::InvalidLiteral))
    }

    fn digits(&mut self, mut on_digit: impl FnMut(f64)) {
        while let Some(byte @ b'0'..=b'9') = self.peek() {
            on_digit(f64::from(byte - b'0'));
            self.pos += 1;
        }
    }

    fn number(&mut self) -> JsonResult<Number> {
        let mut sign = 1.0;
        if self.peek() == Some(b'-') {
            sign = -1.0;
            self.pos += 1;
        }

        let mut mantissa = 0.0f64;
        let mut scale: i32 = 0;
        match self.peek() {
            None => return Err(self.end()),
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.digits(|d| mantissa = mantissa * 10.0 + d),
            Some(_) => return Err(self.fail(ParseFailure::InvalidNumber)),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            match self.peek() {
                None => return Err(self.end()),
                Some(b'0'..=b'9') => self.digits(|d| {
                    mantissa = mantissa * 10.0 + d;
                    scale -= 1;
                }),
                Some(_) => return Err(self.fail(ParseFailure::InvalidNumber)),
            }
        }

        let mut exponent: i32 = 0;
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            let mut negative = false;
            match self.peek() {
                Some(b'+') => self.pos += 1,
                Some(b'-') => {
                    negative = true;
                    self.pos += 1;
                }
                _ => {}
            }
            match self.peek() {
                None => return Err(self.end()),
                Some(b'0'..=b'9') => {}
                Some(_) => return Err(self.fail(ParseFailure::InvalidNumber)),
            }
            while let Some(byte @ b'0'..=b'9') = self.peek() {
                exponent = exponent
                    .saturating_mul(10)
                    .saturating_add(i32::from(byte - b'0'));
                self.pos += 1;
            }
            if negative {
                exponent = -exponent;
            }
        }

        let power = scale.saturating_add(exponent);
        let magnitude = if power < 0 {
            mantissa / 10f64.powi(power.saturating_neg())
        } else {
            mantissa * 10f64.powi(power)
        };
        Ok(Number::new(sign * magnitude))
    }

    /// Parse a quoted string starting at the opening quote
    fn string(&mut self) -> JsonResult<String> {
        let start = self.pos;
        self.pos += 1;
        let mut out: Vec<u8> = Vec::new();
        loop {
            let Some(byte) = self.peek() else {
                return Err(self.end());
            };
            self.pos += 1;
            match byte {
                b'"' => break,
                b'\\' => {
                    let Some(escape) = self.peek() else {
                        return Err(self.end());
                    };
                    self.pos += 1;
                    match escape {
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'u' => self.unicode_escape(&mut out),
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
        String::from_utf8(out).map_err(|_| JsonError::Parse {
            offset: start,
            reason: ParseFailure::InvalidUtf8,
        })
    }

    fn hex4(&mut self) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self.peek().and_then(|b| char::from(b).to_digit(16))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        Some(value)
    }

    /// Decode the escape after `\u`; malformed sequences produce nothing
    fn unicode_escape(&mut self, out: &mut Vec<u8>) {
        let Some(first) = self.hex4() else {
            return;
        };
        if first == 0 || (0xDC00..=0xDFFF).contains(&first) {
            return;
        }

        let code = if (0xD800..=0xDBFF).contains(&first) {
            if self.peek() != Some(b'\\') || self.input.get(self.pos + 1) != Some(&b'u') {
                return;
            }
            self.pos += 2;
            let Some(second) = self.hex4() else {
                return;
            };
            if !(0xDC00..=0xDFFF).contains(&second) {
                return;
            }
            0x10000 + (((first & 0x3FF) << 10) | (second & 0x3FF))
        } else {
            first
        };

        if let Some(ch) = char::from_u32(code) {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
