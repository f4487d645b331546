//! Byte-level stripe format.
//!
//! ```text
//! header  := "FSTR" version:u8 primitive_tag:u8
//! token   := 0 value | 1 | 2 | 3 depth:varint | 4 depth:varint
//! value   := byte:u8 | short/int/long:zigzag varint | float/double:LE
//!          | boolean:u8 | string:varint-length utf8
//! ```

use bytes::{Buf, BufMut};
use fieldstripe_core::{Depth, PrimitiveType, Token, Value};

pub(crate) const MAGIC: &[u8; 4] = b"FSTR";
pub(crate) const VERSION: u8 = 1;
pub(crate) const HEADER_LEN: usize = MAGIC.len() + 2;

const TAG_VALUE: u8 = 0;
const TAG_UNSET: u8 = 1;
const TAG_REPEATED_VALUE: u8 = 2;
const TAG_UNSET_PARENT: u8 = 3;
const TAG_REPEATED_PARENT: u8 = 4;

pub(crate) type CodecResult<T> = Result<T, String>;

pub(crate) fn put_header(buf: &mut impl BufMut, primitive: PrimitiveType) {
    buf.put_slice(MAGIC);
    buf.put_u8(VERSION);
    buf.put_u8(primitive.tag());
}

/// Validate a header and return the primitive type it declares.
pub(crate) fn get_header(buf: &mut impl Buf) -> CodecResult<PrimitiveType> {
    if buf.remaining() < HEADER_LEN {
        return Err("incomplete header".to_string());
    }
    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if &magic != MAGIC {
        return Err(format!("bad magic {magic:02x?}"));
    }
    let version = buf.get_u8();
    if version != VERSION {
        return Err(format!("unsupported format version {version}"));
    }
    let tag = buf.get_u8();
    PrimitiveType::from_tag(tag).ok_or_else(|| format!("unknown primitive type tag {tag}"))
}

pub(crate) fn put_value(
    buf: &mut impl BufMut,
    primitive: PrimitiveType,
    value: &Value,
) -> CodecResult<()> {
    buf.put_u8(TAG_VALUE);
    match (primitive, value) {
        (PrimitiveType::Byte, Value::Byte(v)) => buf.put_i8(*v),
        (PrimitiveType::Short, Value::Short(v)) => put_varint(buf, zigzag(i64::from(*v))),
        (PrimitiveType::Int, Value::Int(v)) => put_varint(buf, zigzag(i64::from(*v))),
        (PrimitiveType::Long, Value::Long(v)) => put_varint(buf, zigzag(*v)),
        (PrimitiveType::Float, Value::Float(v)) => buf.put_f32_le(*v),
        (PrimitiveType::Double, Value::Double(v)) => buf.put_f64_le(*v),
        (PrimitiveType::Boolean, Value::Boolean(v)) => buf.put_u8(u8::from(*v)),
        (PrimitiveType::String, Value::String(v)) => {
            put_varint(buf, v.len() as u64);
            buf.put_slice(v.as_bytes());
        }
        (p, v) => {
            return Err(format!(
                "cannot store {} value in {p} stripe",
                v.variant_name()
            ));
        }
    }
    Ok(())
}

pub(crate) fn put_marker(buf: &mut impl BufMut, token: &Token) {
    match token {
        Token::Unset => buf.put_u8(TAG_UNSET),
        Token::RepeatedValue => buf.put_u8(TAG_REPEATED_VALUE),
        Token::UnsetParent(depth) => {
            buf.put_u8(TAG_UNSET_PARENT);
            put_varint(buf, u64::from(depth.get()));
        }
        Token::RepeatedParent(depth) => {
            buf.put_u8(TAG_REPEATED_PARENT);
            put_varint(buf, u64::from(depth.get()));
        }
        Token::Value(_) => {}
    }
}

pub(crate) fn get_token(buf: &mut impl Buf, primitive: PrimitiveType) -> CodecResult<Token> {
    let tag = get_u8(buf)?;
    match tag {
        TAG_VALUE => get_value(buf, primitive).map(Token::Value),
        TAG_UNSET => Ok(Token::Unset),
        TAG_REPEATED_VALUE => Ok(Token::RepeatedValue),
        TAG_UNSET_PARENT => get_depth(buf).map(Token::UnsetParent),
        TAG_REPEATED_PARENT => get_depth(buf).map(Token::RepeatedParent),
        other => Err(format!("unknown token tag {other}")),
    }
}

fn get_value(buf: &mut impl Buf, primitive: PrimitiveType) -> CodecResult<Value> {
    let value = match primitive {
        PrimitiveType::Byte => Value::Byte(get_u8(buf)? as i8),
        PrimitiveType::Short => {
            let v = unzigzag(get_varint(buf)?);
            Value::Short(i16::try_from(v).map_err(|_| format!("short out of range: {v}"))?)
        }
        PrimitiveType::Int => {
            let v = unzigzag(get_varint(buf)?);
            Value::Int(i32::try_from(v).map_err(|_| format!("int out of range: {v}"))?)
        }
        PrimitiveType::Long => Value::Long(unzigzag(get_varint(buf)?)),
        PrimitiveType::Float => {
            ensure(buf, 4, "float")?;
            Value::Float(buf.get_f32_le())
        }
        PrimitiveType::Double => {
            ensure(buf, 8, "double")?;
            Value::Double(buf.get_f64_le())
        }
        PrimitiveType::Boolean => match get_u8(buf)? {
            0 => Value::Boolean(false),
            1 => Value::Boolean(true),
            other => return Err(format!("invalid boolean byte {other}")),
        },
        PrimitiveType::String => {
            let len = usize::try_from(get_varint(buf)?)
                .map_err(|_| "string length overflows usize".to_string())?;
            ensure(buf, len, "string")?;
            let mut bytes = vec![0u8; len];
            buf.copy_to_slice(&mut bytes);
            let s = String::from_utf8(bytes).map_err(|e| format!("invalid utf-8: {e}"))?;
            Value::from(s)
        }
    };
    Ok(value)
}

fn get_depth(buf: &mut impl Buf) -> CodecResult<Depth> {
    let raw = get_varint(buf)?;
    u32::try_from(raw)
        .ok()
        .and_then(Depth::new)
        .ok_or_else(|| format!("invalid depth {raw}"))
}

fn ensure(buf: &mut impl Buf, len: usize, what: &str) -> CodecResult<()> {
    if buf.remaining() < len {
        return Err(format!("truncated {what}"));
    }
    Ok(())
}

fn get_u8(buf: &mut impl Buf) -> CodecResult<u8> {
    ensure(buf, 1, "token")?;
    Ok(buf.get_u8())
}

fn put_varint(buf: &mut impl BufMut, mut v: u64) {
    while v >= 0x80 {
        buf.put_u8((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    buf.put_u8(v as u8);
}

fn get_varint(buf: &mut impl Buf) -> CodecResult<u64> {
    let mut result = 0u64;
    for shift in (0..64).step_by(7) {
        let byte = get_u8(buf).map_err(|_| "truncated varint".to_string())?;
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err("varint longer than 10 bytes".to_string())
}

fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn unzigzag(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}
