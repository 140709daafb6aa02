//! HTTP transport for API requests.
//!
//! Operations describe their requests as plain [`HttpRequest`] values and hand
//! them to a [`Transport`]. The default transport is [`ReqwestTransport`]; tests
//! and embedders can substitute their own through [`Client::with_transport`].
//!
//! [`Client::with_transport`]: crate::client::Client::with_transport

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::client::ClientError;
use crate::options::ClientOptions;
use crate::stream::ByteStream;

const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

/// A request relative to the configured API root.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl HttpRequest {
    /// A `GET` request without a body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// A `POST` request with a JSON body.
    pub fn post_json<B: Serialize + ?Sized>(
        path: impl Into<String>,
        body: &B,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Json(serde_json::to_value(body)?),
        })
    }

    /// A `POST` request with a `multipart/form-data` body.
    pub fn post_multipart(path: impl Into<String>, form: MultipartForm) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Multipart(form),
        }
    }
}

#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// Transport-independent description of a multipart form.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        data: Bytes,
    },
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a text field when `value` is present.
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.text(name, value.to_string()),
            None => self,
        }
    }

    /// Append a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: Bytes,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Value of the first text field called `name`.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    fn into_reqwest(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    mime_type,
                    data,
                } => {
                    let part = Part::bytes(data.to_vec())
                        .file_name(file_name)
                        .mime_str(&mime_type)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// A fully buffered response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// A response whose body is still arriving.
pub struct StreamingResponse {
    pub status: StatusCode,
    pub body: ByteStream,
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Executes requests against the remote API.
///
/// Implementations own authentication and the base URL. Status codes are
/// returned as-is; classifying failures is left to the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request and buffer the whole response body.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;

    /// Execute a request and hand back the body as it arrives.
    ///
    /// Dropping the returned body stream closes the underlying connection.
    async fn execute_streaming(
        &self,
        request: HttpRequest,
    ) -> Result<StreamingResponse, ClientError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    options: ClientOptions,
}

impl ReqwestTransport {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let http = build_http_client(&options)?;
        Ok(Self { http, options })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.options.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn build(&self, request: HttpRequest) -> Result<RequestBuilder, ClientError> {
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            self.options.api_key.expose_secret()
        ))
        .map_err(|_| ClientError::Config("Invalid API key".to_string()))?;
        auth.set_sensitive(true);

        let mut req = self
            .http
            .request(request.method, self.url(&request.path))
            .header(AUTHORIZATION, auth);

        if let Some(org) = &self.options.organization {
            req = req.header(ORGANIZATION_HEADER, org);
        }
        req = add_extra_headers(req, &self.options.extra_headers);

        Ok(match request.body {
            RequestBody::Empty => req,
            RequestBody::Json(body) => req.json(&body),
            RequestBody::Multipart(form) => req.multipart(form.into_reqwest()?),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let response = self.build(request)?.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, body })
    }

    async fn execute_streaming(
        &self,
        request: HttpRequest,
    ) -> Result<StreamingResponse, ClientError> {
        let response = self.build(request)?.send().await?;
        let status = response.status();
        let body = response.bytes_stream().map_err(ClientError::from);
        Ok(StreamingResponse {
            status,
            body: Box::pin(body),
        })
    }
}

/// Build a configured HTTP client from client options.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(options: &ClientOptions) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &options.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ClientError::Config(format!("Invalid proxy URL {proxy_url}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Add extra headers to a request if specified in client options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
