//! Declarative expectations about a response.
//!
//! # Design
//! An `Expectation` is one check; a `ResponseExpectation` is an immutable,
//! ordered list of them that can be built once and verified against many
//! responses. Verification stops at the first unmet expectation and reports
//! it as an `AssertionError` carrying both expected and actual values.
//!
//! The response body is parsed at most once per `verify` call, and only if a
//! body expectation is declared.

use serde_json::{Number, Value};

use crate::content_type::ContentType;
use crate::error::AssertionError;
use crate::http::HttpResponse;

/// A single check against a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    StatusCode(u16),
    ContentType(ContentType),
    Header { name: String, value: String },
    /// The value at a JSON path equals a literal.
    Body { path: String, expected: Value },
}

impl Expectation {
    pub fn status_code(code: u16) -> Self {
        Expectation::StatusCode(code)
    }

    pub fn content_type(content_type: ContentType) -> Self {
        Expectation::ContentType(content_type)
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Expectation::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn body(path: impl Into<String>, expected: impl Into<Value>) -> Self {
        Expectation::Body {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Check this expectation on its own.
    pub fn verify(&self, response: &HttpResponse) -> Result<(), AssertionError> {
        let mut body = ParsedBody::new(response);
        self.check(response, &mut body)
    }

    fn check(&self, response: &HttpResponse, body: &mut ParsedBody<'_>) -> Result<(), AssertionError> {
        match self {
            Expectation::StatusCode(expected) => {
                if response.status == *expected {
                    Ok(())
                } else {
                    Err(AssertionError::StatusCode {
                        expected: *expected,
                        actual: response.status,
                    })
                }
            }
            Expectation::ContentType(expected) => {
                let actual = response.content_type();
                if expected.matches(actual) {
                    Ok(())
                } else {
                    Err(AssertionError::ContentType {
                        expected: *expected,
                        actual: actual.map(str::to_string),
                    })
                }
            }
            Expectation::Header { name, value } => {
                let actual = response.header(name);
                if actual == Some(value.as_str()) {
                    Ok(())
                } else {
                    Err(AssertionError::Header {
                        name: name.clone(),
                        expected: value.clone(),
                        actual: actual.map(str::to_string),
                    })
                }
            }
            Expectation::Body { path, expected } => {
                let json = body.get().map_err(|reason| AssertionError::BodyNotJson {
                    path: path.clone(),
                    reason,
                })?;
                let found = crate::path::resolve(json, path).map_err(|e| AssertionError::InvalidPath {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                match found {
                    Some(actual) if values_match(actual, expected) => Ok(()),
                    Some(actual) => Err(AssertionError::BodyField {
                        path: path.clone(),
                        expected: expected.clone(),
                        actual: actual.clone(),
                    }),
                    None => Err(AssertionError::PathNotFound {
                        path: path.clone(),
                        expected: expected.clone(),
                    }),
                }
            }
        }
    }
}

/// An immutable, ordered set of expectations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseExpectation {
    expectations: Vec<Expectation>,
}

impl ResponseExpectation {
    pub fn builder() -> ResponseExpectationBuilder {
        ResponseExpectationBuilder::default()
    }

    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Check every expectation in declaration order, failing on the first
    /// one the response does not meet.
    pub fn verify(&self, response: &HttpResponse) -> Result<(), AssertionError> {
        verify_all(response, &self.expectations)
    }
}

/// Check `expectations` in order against `response`.
pub fn verify_all(response: &HttpResponse, expectations: &[Expectation]) -> Result<(), AssertionError> {
    let mut body = ParsedBody::new(response);
    for expectation in expectations {
        expectation.check(response, &mut body)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ResponseExpectationBuilder {
    expectations: Vec<Expectation>,
}

impl ResponseExpectationBuilder {
    pub fn expect_status_code(self, code: u16) -> Self {
        self.expect(Expectation::status_code(code))
    }

    pub fn expect_content_type(self, content_type: ContentType) -> Self {
        self.expect(Expectation::content_type(content_type))
    }

    pub fn expect_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.expect(Expectation::header(name, value))
    }

    pub fn expect_body(self, path: impl Into<String>, expected: impl Into<Value>) -> Self {
        self.expect(Expectation::body(path, expected))
    }

    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Append every expectation of an existing `ResponseExpectation`.
    pub fn add_expectation(mut self, other: &ResponseExpectation) -> Self {
        self.expectations.extend(other.expectations.iter().cloned());
        self
    }

    pub fn build(self) -> ResponseExpectation {
        ResponseExpectation {
            expectations: self.expectations,
        }
    }
}

/// Type-aware equality: numbers compare by numeric value (`1 == 1.0`),
/// everything else by structural JSON equality. A string never equals a
/// number.
pub fn values_match(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => numbers_match(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_match(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_match(x, y)))
        }
        _ => actual == expected,
    }
}

fn numbers_match(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.is_f64(), b.is_f64()) {
        (true, true) => a.as_f64() == b.as_f64(),
        (true, false) => float_equals_integer(a.as_f64(), b),
        (false, true) => float_equals_integer(b.as_f64(), a),
        // A negative i64 against a u64 above i64::MAX.
        (false, false) => false,
    }
}

/// Exact comparison of a float with an integer; no rounding through `f64`.
fn float_equals_integer(float: Option<f64>, integer: &Number) -> bool {
    // 2^63 and 2^64 are exactly representable as f64.
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    const U64_END: f64 = 18_446_744_073_709_551_616.0;

    let Some(f) = float else {
        return false;
    };
    if !f.is_finite() || f.fract() != 0.0 {
        return false;
    }
    if let Some(i) = integer.as_i64() {
        (-I64_END..I64_END).contains(&f) && f as i64 == i
    } else if let Some(u) = integer.as_u64() {
        (0.0..U64_END).contains(&f) && f as u64 == u
    } else {
        false
    }
}

/// Lazily parsed response body, shared by the body expectations of one
/// `verify` call.
struct ParsedBody<'r> {
    response: &'r HttpResponse,
    parsed: Option<Result<Value, String>>,
}

impl<'r> ParsedBody<'r> {
    fn new(response: &'r HttpResponse) -> Self {
        Self {
            response,
            parsed: None,
        }
    }

    fn get(&mut self) -> Result<&Value, String> {
        let response = self.response;
        self.parsed
            .get_or_insert_with(|| response.json().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(Clone::clone)
    }
}
