//! Description of one outgoing call and its resolution into an `HttpRequest`.
//!
//! # Design
//! `Call` is a plain value assembled with by-value setters. It may borrow a
//! shared `RequestShape`; shape values act as defaults and anything set on
//! the call itself wins. `build` is pure: every configuration problem is
//! reported before a transport is involved.

use crate::content_type::ContentType;
use crate::error::ConfigError;
use crate::http::{HttpMethod, HttpRequest};
use crate::shape::{upsert, RequestShape};
use crate::template;

#[derive(Debug, Clone)]
pub struct Call<'s> {
    method: HttpMethod,
    url: String,
    path_params: Vec<(String, String)>,
    query_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    shape: Option<&'s RequestShape>,
}

impl<'s> Call<'s> {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            headers: Vec::new(),
            body: None,
            shape: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Use `shape` for defaults. A later call replaces an earlier shape.
    pub fn shape(mut self, shape: &'s RequestShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        upsert(&mut self.path_params, name.into(), value.to_string(), false);
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        upsert(&mut self.query_params, name.into(), value.to_string(), false);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.headers, name.into(), value.into(), true);
        self
    }

    pub fn content_type(self, content_type: ContentType) -> Self {
        let mime = content_type.mime_types()[0];
        self.header("Content-Type", mime)
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and declare it as such.
    pub fn json_body(self, value: &serde_json::Value) -> Self {
        self.content_type(ContentType::Json).body(value.to_string())
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url_template(&self) -> &str {
        &self.url
    }

    /// Resolve the call into a concrete request.
    ///
    /// Errors when a placeholder has no value, when path parameters set on
    /// the call match no placeholder, when the template is malformed, or
    /// when a relative URL has no base URI.
    pub fn build(&self) -> Result<HttpRequest, ConfigError> {
        let shape_params = self.shape.map(RequestShape::path_params).unwrap_or_default();
        let lookup = |name: &str| {
            self.path_params
                .iter()
                .chain(shape_params)
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let (substituted, used) = template::substitute(&self.url, lookup)?;

        let unused: Vec<String> = self
            .path_params
            .iter()
            .filter(|(name, _)| !used.contains(name))
            .map(|(name, _)| name.clone())
            .collect();
        if !unused.is_empty() {
            return Err(ConfigError::UnusedPathParams {
                names: unused,
                template: self.url.clone(),
            });
        }

        let url = if template::is_absolute(&substituted) {
            substituted
        } else {
            let base_uri = self
                .shape
                .and_then(RequestShape::base_uri)
                .ok_or_else(|| ConfigError::RelativeUrl {
                    url: self.url.clone(),
                })?;
            let base_path = self.shape.and_then(RequestShape::base_path);
            template::join(base_uri, base_path, &substituted)
        };

        let mut query = self
            .shape
            .map(|shape| shape.query_params().to_vec())
            .unwrap_or_default();
        for (name, value) in &self.query_params {
            upsert(&mut query, name.clone(), value.clone(), false);
        }

        let mut headers = self
            .shape
            .map(|shape| shape.headers().to_vec())
            .unwrap_or_default();
        for (name, value) in &self.headers {
            upsert(&mut headers, name.clone(), value.clone(), true);
        }

        Ok(HttpRequest {
            method: self.method,
            url: template::append_query(&url, &query),
            headers,
            body: self.body.clone(),
        })
    }
}
