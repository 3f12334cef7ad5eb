//! Reusable request defaults.
//!
//! # Design
//! A `RequestShape` is built once, typically in a suite fixture, and then
//! only ever borrowed. Fields are private and there are no setters: the
//! builder consumes itself in `build`, so a finished shape is immutable and
//! can be shared across threads by reference.

/// Immutable defaults merged into every `Call` that uses the shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestShape {
    base_uri: Option<String>,
    base_path: Option<String>,
    headers: Vec<(String, String)>,
    path_params: Vec<(String, String)>,
    query_params: Vec<(String, String)>,
}

impl RequestShape {
    pub fn builder() -> RequestShapeBuilder {
        RequestShapeBuilder::default()
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn path_params(&self) -> &[(String, String)] {
        &self.path_params
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }
}

/// Accumulates a `RequestShape`. Later values for the same name replace
/// earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RequestShapeBuilder {
    shape: RequestShape,
}

impl RequestShapeBuilder {
    pub fn set_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.shape.base_uri = Some(base_uri.into());
        self
    }

    pub fn set_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.shape.base_path = Some(base_path.into());
        self
    }

    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.shape.headers, name.into(), value.into(), true);
        self
    }

    pub fn add_path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        upsert(&mut self.shape.path_params, name.into(), value.to_string(), false);
        self
    }

    pub fn add_query_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        upsert(&mut self.shape.query_params, name.into(), value.to_string(), false);
        self
    }

    /// Copy everything `other` declares on top of what is already set.
    pub fn add_shape(mut self, other: &RequestShape) -> Self {
        if let Some(uri) = &other.base_uri {
            self.shape.base_uri = Some(uri.clone());
        }
        if let Some(path) = &other.base_path {
            self.shape.base_path = Some(path.clone());
        }
        for (name, value) in &other.headers {
            upsert(&mut self.shape.headers, name.clone(), value.clone(), true);
        }
        for (name, value) in &other.path_params {
            upsert(&mut self.shape.path_params, name.clone(), value.clone(), false);
        }
        for (name, value) in &other.query_params {
            upsert(&mut self.shape.query_params, name.clone(), value.clone(), false);
        }
        self
    }

    pub fn build(self) -> RequestShape {
        self.shape
    }
}

/// Insert or replace `name` in an ordered list of pairs.
pub(crate) fn upsert(
    pairs: &mut Vec<(String, String)>,
    name: String,
    value: String,
    ignore_case: bool,
) {
    let existing = pairs.iter_mut().find(|(key, _)| {
        if ignore_case {
            key.eq_ignore_ascii_case(&name)
        } else {
            *key == name
        }
    });
    match existing {
        Some(slot) => slot.1 = value,
        None => pairs.push((name, value)),
    }
}
