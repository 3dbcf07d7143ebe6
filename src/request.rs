use reqwest::Method;

use crate::Params;

/// One logical API call: method, path relative to the base URL and cleaned
/// parameters. Built fresh per call and reused unchanged for every attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    params: Params,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>, params: impl Into<Params>) -> Self {
        Self {
            method,
            path: path.into(),
            params: params.into(),
        }
    }

    pub fn get(path: impl Into<String>, params: impl Into<Params>) -> Self {
        Self::new(Method::GET, path, params)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Whether parameters travel as a JSON body rather than a query string.
    pub fn sends_body(&self) -> bool {
        self.method != Method::GET && !self.params.is_empty()
    }

    /// Joins the path onto `base_url`, tolerating slashes on either side.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}
