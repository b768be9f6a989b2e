#![forbid(unsafe_code)]

//! Pass/fail decoding of raw event payloads.
//!
//! Hosts hand event payloads over as [`serde_json::Value`]. A [`Decoder`]
//! turns a payload into a typed value or a [`DecodeError`]; event handlers
//! use the decoded value as the message for the subtree the event fired in.
//!
//! The primitives mirror what view code usually needs:
//!
//! ```
//! use nui_core::decode::{self, Decoder, DecoderExt};
//! use serde_json::json;
//!
//! let text = decode::field("nativeEvent", decode::field("text", decode::string()));
//! let payload = json!({ "nativeEvent": { "text": "hello" } });
//! assert_eq!(text.decode(&payload).unwrap(), "hello");
//!
//! let len = text.map(|s| s.len());
//! assert_eq!(len.decode(&payload).unwrap(), 5);
//! ```

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Reasons a payload did not decode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The payload had the wrong JSON shape.
    #[error("expected {expected}, found {found}")]
    Expected {
        /// What the decoder wanted.
        expected: &'static str,
        /// Short description of what was there instead.
        found: String,
    },
    /// An object lacked a required field.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// A nested decoder failed inside the named field.
    #[error("in field `{field}`: {source}")]
    InField {
        /// Field being decoded.
        field: String,
        /// Underlying failure.
        #[source]
        source: Box<DecodeError>,
    },
    /// Every alternative of an `or` failed; the last error is kept.
    #[error("no alternative matched: {0}")]
    NoAlternative(Box<DecodeError>),
    /// Explicit failure from [`fail`] or a custom decoder.
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// Custom failure with a message.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    fn expected(expected: &'static str, found: &Value) -> Self {
        Self::Expected {
            expected,
            found: describe(found).to_owned(),
        }
    }

    fn in_field(field: &str, source: Self) -> Self {
        Self::InField {
            field: field.to_owned(),
            source: Box::new(source),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decodes a raw payload into a typed value.
pub trait Decoder {
    /// Type produced on success.
    type Output;

    /// Run the decoder against a payload.
    fn decode(&self, value: &Value) -> Result<Self::Output, DecodeError>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    type Output = D::Output;

    fn decode(&self, value: &Value) -> Result<Self::Output, DecodeError> {
        (**self).decode(value)
    }
}

impl<D: Decoder + ?Sized> Decoder for std::rc::Rc<D> {
    type Output = D::Output;

    fn decode(&self, value: &Value) -> Result<Self::Output, DecodeError> {
        (**self).decode(value)
    }
}

/// Combinators available on every decoder.
pub trait DecoderExt: Decoder + Sized {
    /// Transform the decoded value.
    fn map<T, F>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> T,
    {
        Map { inner: self, f }
    }

    /// Choose a follow-up decoder based on the decoded value; the follow-up
    /// runs against the same payload.
    fn and_then<D, F>(self, f: F) -> AndThen<Self, F>
    where
        D: Decoder,
        F: Fn(Self::Output) -> D,
    {
        AndThen { inner: self, f }
    }

    /// Fall back to `other` when this decoder fails.
    fn or<D>(self, other: D) -> Or<Self, D>
    where
        D: Decoder<Output = Self::Output>,
    {
        Or {
            first: self,
            second: other,
        }
    }
}

impl<D: Decoder> DecoderExt for D {}

/// See [`DecoderExt::map`].
#[derive(Debug, Clone)]
pub struct Map<D, F> {
    inner: D,
    f: F,
}

impl<D, F, T> Decoder for Map<D, F>
where
    D: Decoder,
    F: Fn(D::Output) -> T,
{
    type Output = T;

    fn decode(&self, value: &Value) -> Result<T, DecodeError> {
        self.inner.decode(value).map(&self.f)
    }
}

/// See [`DecoderExt::and_then`].
#[derive(Debug, Clone)]
pub struct AndThen<D, F> {
    inner: D,
    f: F,
}

impl<D, F, N> Decoder for AndThen<D, F>
where
    D: Decoder,
    N: Decoder,
    F: Fn(D::Output) -> N,
{
    type Output = N::Output;

    fn decode(&self, value: &Value) -> Result<N::Output, DecodeError> {
        let first = self.inner.decode(value)?;
        (self.f)(first).decode(value)
    }
}

/// See [`DecoderExt::or`].
#[derive(Debug, Clone)]
pub struct Or<A, B> {
    first: A,
    second: B,
}

impl<A, B> Decoder for Or<A, B>
where
    A: Decoder,
    B: Decoder<Output = A::Output>,
{
    type Output = A::Output;

    fn decode(&self, value: &Value) -> Result<A::Output, DecodeError> {
        self.first.decode(value).or_else(|_| {
            self.second
                .decode(value)
                .map_err(|err| DecodeError::NoAlternative(Box::new(err)))
        })
    }
}

/// Decoder backed by a closure. Built with [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

impl<F, T> Decoder for FromFn<F>
where
    F: Fn(&Value) -> Result<T, DecodeError>,
{
    type Output = T;

    fn decode(&self, value: &Value) -> Result<T, DecodeError> {
        (self.0)(value)
    }
}

/// Build a decoder from a closure.
pub fn from_fn<F, T>(f: F) -> FromFn<F>
where
    F: Fn(&Value) -> Result<T, DecodeError>,
{
    FromFn(f)
}

/// Decoder that ignores the payload and yields a clone of `value`.
#[derive(Debug, Clone)]
pub struct Succeed<T>(T);

impl<T: Clone> Decoder for Succeed<T> {
    type Output = T;

    fn decode(&self, _value: &Value) -> Result<T, DecodeError> {
        Ok(self.0.clone())
    }
}

/// Always succeed with `value`. Typical for taps and presses whose payload
/// carries nothing the application needs.
pub fn succeed<T: Clone>(value: T) -> Succeed<T> {
    Succeed(value)
}

/// Decoder that always fails. Built with [`fail`].
#[derive(Debug, Clone)]
pub struct Fail<T> {
    reason: String,
    _out: PhantomData<fn() -> T>,
}

impl<T> Decoder for Fail<T> {
    type Output = T;

    fn decode(&self, _value: &Value) -> Result<T, DecodeError> {
        Err(DecodeError::Custom(self.reason.clone()))
    }
}

/// Always fail with `reason`.
pub fn fail<T>(reason: impl Into<String>) -> Fail<T> {
    Fail {
        reason: reason.into(),
        _out: PhantomData,
    }
}

/// Decoder for one JSON primitive. Built with [`string`], [`bool`],
/// [`i64`], [`f64`] or [`value`].
#[derive(Debug, Clone, Copy)]
pub struct Primitive<T> {
    extract: fn(&Value) -> Result<T, DecodeError>,
}

impl<T> Decoder for Primitive<T> {
    type Output = T;

    fn decode(&self, value: &Value) -> Result<T, DecodeError> {
        (self.extract)(value)
    }
}

/// Decode a JSON string.
pub fn string() -> Primitive<String> {
    Primitive {
        extract: |v| match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(DecodeError::expected("a string", other)),
        },
    }
}

/// Decode a JSON boolean.
pub fn bool() -> Primitive<bool> {
    Primitive {
        extract: |v| v.as_bool().ok_or_else(|| DecodeError::expected("a boolean", v)),
    }
}

/// Decode an integral JSON number.
pub fn i64() -> Primitive<i64> {
    Primitive {
        extract: |v| v.as_i64().ok_or_else(|| DecodeError::expected("an integer", v)),
    }
}

/// Decode any JSON number as `f64`.
pub fn f64() -> Primitive<f64> {
    Primitive {
        extract: |v| v.as_f64().ok_or_else(|| DecodeError::expected("a number", v)),
    }
}

/// Pass the raw payload through unchanged.
pub fn value() -> Primitive<Value> {
    Primitive {
        extract: |v| Ok(v.clone()),
    }
}

/// Decoder for a named object field. Built with [`field`].
#[derive(Debug, Clone)]
pub struct Field<D> {
    name: String,
    inner: D,
}

impl<D: Decoder> Decoder for Field<D> {
    type Output = D::Output;

    fn decode(&self, value: &Value) -> Result<D::Output, DecodeError> {
        let Value::Object(map) = value else {
            return Err(DecodeError::expected("an object", value));
        };
        let Some(inner) = map.get(&self.name) else {
            return Err(DecodeError::MissingField(self.name.clone()));
        };
        self.inner
            .decode(inner)
            .map_err(|err| DecodeError::in_field(&self.name, err))
    }
}

/// Decode field `name` of an object with `inner`.
pub fn field<D: Decoder>(name: impl Into<String>, inner: D) -> Field<D> {
    Field {
        name: name.into(),
        inner,
    }
}

/// Decode the value found by following `path` through nested objects.
pub fn at<D: Decoder>(path: &[&str], inner: D) -> At<D> {
    At {
        path: path.iter().map(|s| (*s).to_owned()).collect(),
        inner,
    }
}

/// See [`at`].
#[derive(Debug, Clone)]
pub struct At<D> {
    path: Vec<String>,
    inner: D,
}

impl<D: Decoder> Decoder for At<D> {
    type Output = D::Output;

    fn decode(&self, value: &Value) -> Result<D::Output, DecodeError> {
        let mut current = value;
        for (depth, name) in self.path.iter().enumerate() {
            let wrap = |err: DecodeError| {
                self.path[..depth]
                    .iter()
                    .rev()
                    .fold(err, |acc, outer| DecodeError::in_field(outer, acc))
            };
            let Value::Object(map) = current else {
                return Err(wrap(DecodeError::expected("an object", current)));
            };
            current = map
                .get(name)
                .ok_or_else(|| wrap(DecodeError::MissingField(name.clone())))?;
        }
        self.inner.decode(current).map_err(|err| {
            self.path
                .iter()
                .rev()
                .fold(err, |acc, outer| DecodeError::in_field(outer, acc))
        })
    }
}

/// Decoder deserializing through serde. Built with [`json`].
#[derive(Debug)]
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Json<T> {}

impl<T: DeserializeOwned> Decoder for Json<T> {
    type Output = T;

    fn decode(&self, value: &Value) -> Result<T, DecodeError> {
        T::deserialize(value).map_err(|err| DecodeError::Custom(err.to_string()))
    }
}

/// Decode any `serde::Deserialize` type.
pub fn json<T: DeserializeOwned>() -> Json<T> {
    Json(PhantomData)
}

/// Decode an RFC 3339 timestamp string into a date-time.
///
/// Date pickers report their selection this way; pair with [`encode_date`]
/// for the matching prop value.
pub fn parse_date() -> Primitive<OffsetDateTime> {
    Primitive {
        extract: |v| match v {
            Value::String(s) => OffsetDateTime::parse(s, &Rfc3339)
                .map_err(|err| DecodeError::Custom(format!("expected a date: {err}"))),
            other => Err(DecodeError::expected("a date string", other)),
        },
    }
}

/// Encode a date-time as a prop value (RFC 3339 string).
///
/// Dates outside the RFC 3339 range encode as `null`.
pub fn encode_date(date: OffsetDateTime) -> Value {
    date.format(&Rfc3339).map(Value::String).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn primitives_decode_matching_shapes() {
        assert_eq!(string().decode(&json!("hi")), Ok("hi".to_owned()));
        assert_eq!(bool().decode(&json!(true)), Ok(true));
        assert_eq!(i64().decode(&json!(-3)), Ok(-3));
        assert_eq!(f64().decode(&json!(1.5)), Ok(1.5));
        assert_eq!(value().decode(&json!([1])), Ok(json!([1])));
    }

    #[test]
    fn primitives_reject_other_shapes() {
        assert_eq!(
            string().decode(&json!(3)),
            Err(DecodeError::Expected {
                expected: "a string",
                found: "a number".to_owned(),
            })
        );
        assert!(i64().decode(&json!(1.5)).is_err());
        assert!(bool().decode(&Value::Null).is_err());
    }

    #[test]
    fn field_reports_path() {
        let dec = field("nativeEvent", field("text", string()));
        assert_eq!(
            dec.decode(&json!({"nativeEvent": {"text": "x"}})),
            Ok("x".to_owned())
        );
        let err = dec.decode(&json!({"nativeEvent": {}})).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InField {
                field: "nativeEvent".to_owned(),
                source: Box::new(DecodeError::MissingField("text".to_owned())),
            }
        );
        assert_eq!(err.to_string(), "in field `nativeEvent`: missing field `text`");
    }

    #[test]
    fn at_walks_nested_objects() {
        let dec = at(&["nativeEvent", "contentOffset", "y"], f64());
        let payload = json!({"nativeEvent": {"contentOffset": {"y": 12.0}}});
        assert_eq!(dec.decode(&payload), Ok(12.0));

        let err = dec
            .decode(&json!({"nativeEvent": {"contentOffset": 3}}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "in field `nativeEvent`: in field `contentOffset`: expected an object, found a number"
        );
    }

    #[test]
    fn at_with_empty_path_decodes_root() {
        assert_eq!(at(&[], i64()).decode(&json!(7)), Ok(7));
    }

    #[test]
    fn map_and_then_or_compose() {
        let doubled = i64().map(|n| n * 2);
        assert_eq!(doubled.decode(&json!(4)), Ok(8));

        let tagged = field("kind", string()).and_then(|kind| {
            let name = if kind == "a" { "left" } else { "right" };
            field(name, i64())
        });
        assert_eq!(tagged.decode(&json!({"kind": "a", "left": 1})), Ok(1));
        assert_eq!(tagged.decode(&json!({"kind": "b", "right": 2})), Ok(2));

        let either = field("x", i64()).or(succeed(0));
        assert_eq!(either.decode(&json!({})), Ok(0));
        let neither = field("x", i64()).or(fail::<i64>("nope"));
        assert_eq!(
            neither.decode(&json!({})),
            Err(DecodeError::NoAlternative(Box::new(DecodeError::custom(
                "nope"
            ))))
        );
    }

    #[test]
    fn json_uses_serde() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Layout {
            width: u32,
            height: u32,
        }
        let dec = json::<Layout>();
        assert_eq!(
            dec.decode(&json!({"width": 3, "height": 4})),
            Ok(Layout {
                width: 3,
                height: 4
            })
        );
        assert!(dec.decode(&json!({"width": 3})).is_err());
    }

    #[test]
    fn from_fn_wraps_closure() {
        let dec = from_fn(|v: &Value| {
            v.as_array()
                .map(Vec::len)
                .ok_or_else(|| DecodeError::custom("not a list"))
        });
        assert_eq!(dec.decode(&json!([1, 2, 3])), Ok(3));
        assert_eq!(dec.decode(&json!(1)), Err(DecodeError::custom("not a list")));
    }

    #[test]
    fn dates_round_trip_through_props() {
        let date = parse_date()
            .decode(&json!("2024-02-29T12:30:00Z"))
            .expect("valid date");
        assert_eq!(date.year(), 2024);
        assert_eq!(encode_date(date), json!("2024-02-29T12:30:00Z"));
        assert!(parse_date().decode(&json!("yesterday")).is_err());
        assert!(parse_date().decode(&json!(0)).is_err());
    }
}
