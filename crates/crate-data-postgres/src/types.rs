//! Wire conversions between untyped record values and PostgreSQL types
//!
//! Record values arrive as text, numbers or booleans while the server expects
//! a binary value of the parameter type it inferred. [`PgParam`] encodes each
//! parameter from its textual form once that type is known. In the other
//! direction [`normalize`] turns a result column into a JSON scalar.

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use crate_data_core::{SqlParam, TIMESTAMP_FORMAT};
use serde_json::{Number, Value};
use std::error::Error;
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, Kind, ToSql, Type};
use tokio_postgres::Row;
use tracing::warn;

type BoxError = Box<dyn Error + Sync + Send>;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;

/// Statement parameter encoded according to the server-inferred type
#[derive(Debug)]
pub struct PgParam<'a>(pub &'a SqlParam);

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        let ty = base_type(ty);

        if let (SqlParam::Bool(b), &Type::BOOL) = (self.0, ty) {
            return b.to_sql(ty, out);
        }
        let Some(text) = self.0.as_text() else {
            return Ok(IsNull::Yes);
        };

        match *ty {
            Type::BOOL => parse_bool(&text)?.to_sql(ty, out),
            Type::INT2 => text.trim().parse::<i16>()?.to_sql(ty, out),
            Type::INT4 => text.trim().parse::<i32>()?.to_sql(ty, out),
            Type::INT8 => text.trim().parse::<i64>()?.to_sql(ty, out),
            Type::OID => text.trim().parse::<u32>()?.to_sql(ty, out),
            Type::FLOAT4 => text.trim().parse::<f32>()?.to_sql(ty, out),
            Type::FLOAT8 => text.trim().parse::<f64>()?.to_sql(ty, out),
            Type::NUMERIC => {
                encode_numeric(&text, out)?;
                Ok(IsNull::No)
            }
            Type::JSON | Type::JSONB => {
                let json = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
                json.to_sql(ty, out)
            }
            Type::TIMESTAMP => parse_naive_datetime(&text)?.to_sql(ty, out),
            Type::TIMESTAMPTZ => parse_datetime(&text)?.to_sql(ty, out),
            Type::DATE => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")?.to_sql(ty, out),
            Type::TIME => NaiveTime::parse_from_str(text.trim(), "%H:%M:%S%.f")?.to_sql(ty, out),
            Type::UUID => uuid::Uuid::parse_str(text.trim())?.to_sql(ty, out),
            Type::BYTEA => text.as_bytes().to_sql(ty, out),
            // Text-like and user types share the raw text representation
            _ => {
                out.put_slice(text.as_bytes());
                Ok(IsNull::No)
            }
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn base_type(ty: &Type) -> &Type {
    match ty.kind() {
        Kind::Domain(inner) => base_type(inner),
        _ => ty,
    }
}

fn parse_bool(text: &str) -> Result<bool, BoxError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Ok(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("invalid boolean '{other}'").into()),
    }
}

fn parse_naive_datetime(text: &str) -> Result<NaiveDateTime, BoxError> {
    let text = text.trim();
    [TIMESTAMP_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid timestamp '{text}'").into())
}

/// RFC 3339 text keeps its offset; naive text is read as local time
fn parse_datetime(text: &str) -> Result<DateTime<FixedOffset>, BoxError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text.trim()) {
        return Ok(parsed);
    }
    let naive = parse_naive_datetime(text)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
        .ok_or_else(|| format!("timestamp '{text}' does not exist in the local time zone").into())
}

/// Binary `numeric`: ndigits, weight, sign, dscale, then base-10000 digits
fn encode_numeric(text: &str, out: &mut BytesMut) -> Result<(), BoxError> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("nan") {
        out.put_i16(0);
        out.put_i16(0);
        out.put_u16(NUMERIC_NAN);
        out.put_u16(0);
        return Ok(());
    }

    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let valid = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !valid(int_part) || !valid(frac_part) {
        return Err(format!("invalid numeric '{text}'").into());
    }

    let int_part = int_part.trim_start_matches('0');
    let int_pad = (4 - int_part.len() % 4) % 4;
    let frac_pad = (4 - frac_part.len() % 4) % 4;
    let padded = format!(
        "{}{}{}{}",
        "0".repeat(int_pad),
        int_part,
        frac_part,
        "0".repeat(frac_pad)
    );

    let mut digits: Vec<i16> = padded
        .as_bytes()
        .chunks(4)
        .map(|chunk| chunk.iter().fold(0i16, |acc, b| acc * 10 + i16::from(b - b'0')))
        .collect();
    let mut weight = ((int_part.len() + int_pad) / 4) as i16 - 1;

    let leading = digits.iter().take_while(|d| **d == 0).count();
    digits.drain(..leading);
    weight -= leading as i16;
    while digits.last() == Some(&0) {
        digits.pop();
    }

    let sign = if negative && !digits.is_empty() {
        NUMERIC_NEG
    } else {
        NUMERIC_POS
    };
    if digits.is_empty() {
        weight = 0;
    }

    out.put_i16(i16::try_from(digits.len())?);
    out.put_i16(weight);
    out.put_u16(sign);
    out.put_u16(u16::try_from(frac_part.len())?);
    for digit in digits {
        out.put_i16(digit);
    }
    Ok(())
}

fn decode_numeric(raw: &[u8]) -> Result<String, BoxError> {
    let read = |offset: usize| -> Result<i16, BoxError> {
        raw.get(offset..offset + 2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".into())
    };

    let ndigits = read(0)?.max(0) as usize;
    let weight = i64::from(read(2)?);
    let sign = read(4)? as u16;
    let dscale = read(6)?.max(0) as usize;
    let digits = (0..ndigits)
        .map(|i| read(8 + i * 2).map(i64::from))
        .collect::<Result<Vec<_>, _>>()?;

    if sign == NUMERIC_NAN {
        return Ok("NaN".to_string());
    }
    let digit_at = |index: i64| -> i64 {
        usize::try_from(index)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut result = String::new();
    if sign == NUMERIC_NEG {
        result.push('-');
    }

    if weight < 0 {
        result.push('0');
    } else {
        result.push_str(&digit_at(0).to_string());
        for index in 1..=weight {
            result.push_str(&format!("{:04}", digit_at(index)));
        }
    }

    if dscale > 0 {
        let mut fraction = String::new();
        let mut index = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit_at(index)));
            index += 1;
        }
        fraction.truncate(dscale);
        result.push('.');
        result.push_str(&fraction);
    }

    Ok(result)
}

/// `numeric` column decoded to its exact decimal text
struct NumericText(String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        decode_numeric(raw).map(NumericText)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

/// Undecoded column bytes for types without a dedicated mapping
struct RawBytes(Vec<u8>);

impl<'a> FromSql<'a> for RawBytes {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(RawBytes(raw.to_vec()))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// Column `index` of `row` as a JSON scalar.
///
/// Integers, text, temporal values and JSON documents become strings;
/// booleans and floats pass through.
pub fn normalize(row: &Row, index: usize) -> Result<Value, tokio_postgres::Error> {
    let ty = row.columns()[index].type_().clone();
    let ty = base_type(&ty);

    fn string<T: ToString>(value: Option<T>) -> Value {
        value.map_or(Value::Null, |v| Value::String(v.to_string()))
    }

    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(index)?.map_or(Value::Null, Value::Bool),
        Type::INT2 => string(row.try_get::<_, Option<i16>>(index)?),
        Type::INT4 => string(row.try_get::<_, Option<i32>>(index)?),
        Type::INT8 => string(row.try_get::<_, Option<i64>>(index)?),
        Type::OID => string(row.try_get::<_, Option<u32>>(index)?),
        Type::FLOAT4 => float(row.try_get::<_, Option<f32>>(index)?.map(f64::from)),
        Type::FLOAT8 => float(row.try_get::<_, Option<f64>>(index)?),
        Type::NUMERIC => string(row.try_get::<_, Option<NumericText>>(index)?.map(|n| n.0)),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            string(row.try_get::<_, Option<String>>(index)?)
        }
        Type::JSON | Type::JSONB => string(row.try_get::<_, Option<Value>>(index)?),
        Type::TIMESTAMP => string(
            row.try_get::<_, Option<NaiveDateTime>>(index)?
                .map(|ts| ts.format(TIMESTAMP_FORMAT)),
        ),
        Type::TIMESTAMPTZ => string(
            row.try_get::<_, Option<DateTime<Local>>>(index)?
                .map(|ts| ts.format(TIMESTAMP_FORMAT)),
        ),
        Type::DATE => string(row.try_get::<_, Option<NaiveDate>>(index)?),
        Type::TIME => string(row.try_get::<_, Option<NaiveTime>>(index)?),
        Type::UUID => string(row.try_get::<_, Option<uuid::Uuid>>(index)?),
        Type::BYTEA => string(
            row.try_get::<_, Option<Vec<u8>>>(index)?
                .map(|b| String::from_utf8_lossy(&b).into_owned()),
        ),
        _ => match row.try_get::<_, Option<RawBytes>>(index)? {
            None => Value::Null,
            Some(RawBytes(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => Value::String(text),
                Err(_) => {
                    warn!(column = row.columns()[index].name(), ty = %ty, "Unsupported column type");
                    Value::Null
                }
            },
        },
    };
    Ok(value)
}

fn float(value: Option<f64>) -> Value {
    value.map_or(Value::Null, |f| {
        Number::from_f64(f).map_or_else(|| Value::String(f.to_string()), Value::Number)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_bytes(text: &str) -> Vec<u8> {
        let mut out = BytesMut::new();
        encode_numeric(text, &mut out).unwrap();
        out.to_vec()
    }

    fn words(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks(2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]))
            .collect()
    }

    fn encode(param: SqlParam, ty: &Type) -> Result<Option<Vec<u8>>, BoxError> {
        let mut out = BytesMut::new();
        match PgParam(&param).to_sql(ty, &mut out)? {
            IsNull::Yes => Ok(None),
            IsNull::No => Ok(Some(out.to_vec())),
        }
    }

    #[test]
    fn test_numeric_layout() {
        // 12345.678 = [1][2345].[6780], weight 1, dscale 3
        assert_eq!(words(&numeric_bytes("12345.678")), vec![3, 1, 0, 3, 1, 2345, 6780]);
        // 0.0001 = [0001] at weight -1
        assert_eq!(words(&numeric_bytes("0.0001")), vec![1, -1, 0, 4, 1]);
        assert_eq!(words(&numeric_bytes("-10000")), vec![1, 1, 0x4000, 0, 1]);
        assert_eq!(words(&numeric_bytes("0.00")), vec![0, 0, 0, 2]);
    }

    #[test]
    fn test_numeric_text_survives_the_wire_format() {
        for text in ["0", "1", "-1", "12345.678", "0.0001", "10000", "-98765432.1", "3.14159", "0.50"] {
            assert_eq!(decode_numeric(&numeric_bytes(text)).unwrap(), text, "value {text}");
        }
        assert_eq!(decode_numeric(&numeric_bytes("007.5")).unwrap(), "7.5");
        assert_eq!(decode_numeric(&numeric_bytes("NaN")).unwrap(), "NaN");
    }

    #[test]
    fn test_numeric_rejects_garbage() {
        let mut out = BytesMut::new();
        assert!(encode_numeric("12a", &mut out).is_err());
        assert!(encode_numeric(".", &mut out).is_err());
        assert!(decode_numeric(&[0, 1]).is_err());
    }

    #[test]
    fn test_text_param_encodes_as_server_type() {
        assert_eq!(encode("42".into(), &Type::INT4).unwrap(), Some(42i32.to_be_bytes().to_vec()));
        assert_eq!(encode("42".into(), &Type::INT8).unwrap(), Some(42i64.to_be_bytes().to_vec()));
        assert_eq!(encode("true".into(), &Type::BOOL).unwrap(), Some(vec![1]));
        assert_eq!(encode(SqlParam::Bool(false), &Type::BOOL).unwrap(), Some(vec![0]));
        assert_eq!(encode("Jane".into(), &Type::TEXT).unwrap(), Some(b"Jane".to_vec()));
        assert_eq!(encode(SqlParam::Int(7), &Type::TEXT).unwrap(), Some(b"7".to_vec()));
        assert_eq!(encode(SqlParam::Null, &Type::INT4).unwrap(), None);
    }

    #[test]
    fn test_json_params_carry_jsonb_version() {
        let bytes = encode(r#"["a"]"#.into(), &Type::JSONB).unwrap().unwrap();
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..], br#"["a"]"#);

        let bytes = encode("plain".into(), &Type::JSON).unwrap().unwrap();
        assert_eq!(bytes, br#""plain""#.to_vec());
    }

    #[test]
    fn test_bad_text_for_typed_column_fails() {
        assert!(encode("abc".into(), &Type::INT4).is_err());
        assert!(encode("maybe".into(), &Type::BOOL).is_err());
        assert!(encode("not-a-uuid".into(), &Type::UUID).is_err());
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_naive_datetime("2024-01-06 10:11:12.123456").is_ok());
        assert!(parse_naive_datetime("2024-01-06T10:11:12").is_ok());
        assert!(parse_naive_datetime("2024-01-06").is_ok());
        assert!(parse_naive_datetime("yesterday").is_err());
        assert_eq!(
            parse_datetime("2024-01-06T10:11:12+02:00").unwrap().offset().local_minus_utc(),
            7200
        );
    }
}
