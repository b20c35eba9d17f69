//! Mutating requests and the cache prefixes they invalidate
//!
//! Parent pages issue mutations; tables never do. A successful mutation
//! drops every cached page under the prefixes it names so that all table
//! variants over the same resource refetch, whatever page, sort or search
//! they are on.
//!
//! # Example
//!
//! ```ignore
//! use envmon_lib::api::Mutation;
//!
//! let op = Mutation::delete("/nodes/42/companies/7").invalidates("/nodes/42/companies");
//! client.execute(&op).await?;
//! ```

use log::debug;
use reqwest::Method;

use crate::EnvmonClient;
use crate::error::ApiError;
use crate::error::Error;

/// HTTP method of a [`Mutation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMethod {
    Post,
    Put,
    Patch,
    Delete,
}

impl MutationMethod {
    fn as_method(&self) -> Method {
        match self {
            MutationMethod::Post => Method::POST,
            MutationMethod::Put => Method::PUT,
            MutationMethod::Patch => Method::PATCH,
            MutationMethod::Delete => Method::DELETE,
        }
    }
}

/// A create/update/delete request plus the cache prefixes it invalidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    method: MutationMethod,
    path: String,
    body: Option<serde_json::Value>,
    invalidates: Vec<String>,
}

impl Mutation {
    fn new(method: MutationMethod, path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            invalidates: Vec::new(),
        }
    }

    /// `POST path` with a JSON body.
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(MutationMethod::Post, path, Some(body))
    }

    /// `PUT path` with a JSON body.
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(MutationMethod::Put, path, Some(body))
    }

    /// `PATCH path` with a JSON body.
    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(MutationMethod::Patch, path, Some(body))
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(MutationMethod::Delete, path, None)
    }

    /// Adds a cache key prefix to drop once the request succeeds.
    pub fn invalidates(mut self, prefix: impl Into<String>) -> Self {
        self.invalidates.push(prefix.into());
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> MutationMethod {
        self.method
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the JSON body, if any.
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Returns the prefixes invalidated on success.
    pub fn invalidated_prefixes(&self) -> &[String] {
        &self.invalidates
    }
}

impl EnvmonClient {
    /// Sends `mutation` and, on success, invalidates its cache prefixes.
    ///
    /// Returns the JSON response body, or `None` for an empty body. A non-2xx
    /// status invalidates nothing; once the status is 2xx the prefixes are
    /// dropped even if the body cannot be read.
    pub async fn execute(&self, mutation: &Mutation) -> Result<Option<serde_json::Value>, Error> {
        let response = self
            .request(mutation.method.as_method(), &mutation.path, mutation.body.as_ref())
            .await?;

        for prefix in &mutation.invalidates {
            self.cache().invalidate_prefix(prefix).await;
        }

        let bytes = response.bytes().await.map_err(ApiError::from)?;

        if bytes.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!("mutation: non-JSON response from {}: {}", mutation.path, e);
                Ok(None)
            }
        }
    }
}
