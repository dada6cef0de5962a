//! reqwest-backed [`Transport`].
//!
//! One `HttpTransport` owns one client and one cookie jar, so each extraction
//! run gets an isolated session.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use async_trait::async_trait;
use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Proxy, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::FetchOptions;
use crate::user_agent;

use super::{
    FORM_MEDIA_TYPE, JSON_MEDIA_TYPE, MARKUP_MEDIA_TYPE, MarkupStream, Transport, TransportError,
};

/// Essence and charset parameter of a `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    /// Lowercased `type/subtype`.
    pub essence: String,
    /// Raw `charset` parameter, unquoted.
    pub charset: Option<String>,
}

/// Splits a `Content-Type` value into essence and charset.
#[must_use]
pub fn parse_media_type(value: &str) -> MediaType {
    let mut parts = value.split(';');
    let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let charset = parts.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    });
    MediaType { essence, charset }
}

/// Production transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    chunk_size: usize,
}

impl HttpTransport {
    /// Builds a client with a fresh cookie jar and the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] when client construction fails.
    pub fn new(options: &FetchOptions) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let client = build_http_client(options, &jar)?;
        Ok(Self {
            client,
            chunk_size: options.chunk_size.max(1),
        })
    }

    /// Sends a GET and enforces status 200 and the expected media type.
    async fn request(
        &self,
        url: &Url,
        expected: &'static str,
    ) -> Result<(Response, MediaType), TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, expected)
            .send()
            .await
            .map_err(|error| TransportError::from_reqwest(url.as_str(), error))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::http_status(url.as_str(), status.as_u16()));
        }

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let media = declared.as_deref().map(parse_media_type);
        match media {
            Some(media) if media.essence == expected => {
                debug!(url = %url, content_type = %media.essence, "Response accepted");
                Ok((response, media))
            }
            _ => Err(TransportError::content_type(
                url.as_str(),
                expected,
                declared.as_deref(),
            )),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, url), fields(url = %url))]
    async fn open_markup(&self, url: &Url) -> Result<Box<dyn MarkupStream>, TransportError> {
        let (response, media) = self.request(url, MARKUP_MEDIA_TYPE).await?;
        let encoding = resolve_encoding(url, &media)?;
        debug!(encoding = encoding.name(), chunk_size = self.chunk_size, "Streaming markup body");

        let body = response
            .bytes_stream()
            .map(|piece| piece.map(|bytes| bytes.to_vec()))
            .boxed();
        Ok(Box::new(ChunkedBody::new(
            url.as_str(),
            body,
            encoding,
            self.chunk_size,
        )))
    }

    #[tracing::instrument(skip(self, url), fields(url = %url))]
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        let (response, media) = self.request(url, JSON_MEDIA_TYPE).await?;
        let encoding = resolve_encoding(url, &media)?;
        let text = decode_body(url, response, encoding).await?;
        serde_json::from_str(&text)
            .map_err(|error| TransportError::payload(url.as_str(), error.to_string()))
    }

    #[tracing::instrument(skip(self, url), fields(url = %url))]
    async fn get_form(&self, url: &Url) -> Result<String, TransportError> {
        let (response, media) = self.request(url, FORM_MEDIA_TYPE).await?;
        let encoding = resolve_encoding(url, &media)?;
        decode_body(url, response, encoding).await
    }
}

/// Encoding named by the charset parameter; UTF-8 when none is declared.
fn resolve_encoding(url: &Url, media: &MediaType) -> Result<&'static Encoding, TransportError> {
    match media.charset.as_deref() {
        None => Ok(UTF_8),
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| TransportError::unrecognized_encoding(url.as_str(), label)),
    }
}

/// Reads a whole body and decodes it; a byte order mark overrides `encoding`.
async fn decode_body(
    url: &Url,
    response: Response,
    encoding: &'static Encoding,
) -> Result<String, TransportError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|error| TransportError::from_reqwest(url.as_str(), error))?;
    let (text, _, _) = encoding.decode(&bytes);
    Ok(text.into_owned())
}

/// Re-chunks a byte stream to a fixed size and decodes it incrementally.
///
/// Multi-byte sequences split across chunks are carried by the decoder.
struct ChunkedBody {
    url: String,
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    pending: Vec<u8>,
    decoder: Decoder,
    chunk_size: usize,
    exhausted: bool,
    flushed: bool,
}

impl ChunkedBody {
    fn new(
        url: &str,
        body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
        encoding: &'static Encoding,
        chunk_size: usize,
    ) -> Self {
        Self {
            url: url.to_string(),
            body,
            pending: Vec::new(),
            decoder: encoding.new_decoder(),
            chunk_size: chunk_size.max(1),
            exhausted: false,
            flushed: false,
        }
    }
}

#[async_trait]
impl MarkupStream for ChunkedBody {
    async fn next_chunk(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            while !self.exhausted && self.pending.len() < self.chunk_size {
                match self.body.next().await {
                    Some(Ok(bytes)) => self.pending.extend_from_slice(&bytes),
                    Some(Err(error)) => {
                        return Err(TransportError::from_reqwest(self.url.clone(), error));
                    }
                    None => self.exhausted = true,
                }
            }

            if self.pending.is_empty() {
                if self.flushed {
                    return Ok(None);
                }
                self.flushed = true;
                let tail = decode(&mut self.decoder, &[], true);
                return Ok((!tail.is_empty()).then_some(tail));
            }

            let take = self.pending.len().min(self.chunk_size);
            let bytes: Vec<u8> = self.pending.drain(..take).collect();
            let last = self.exhausted && self.pending.is_empty();
            let text = decode(&mut self.decoder, &bytes, last);
            if last {
                self.flushed = true;
            }
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
}

fn decode(decoder: &mut Decoder, input: &[u8], last: bool) -> String {
    let capacity = decoder
        .max_utf8_buffer_length(input.len())
        .unwrap_or_else(|| input.len().saturating_mul(3).saturating_add(16));
    let mut out = String::with_capacity(capacity);
    let mut consumed = 0;
    loop {
        let (result, read, _replaced) = decoder.decode_to_string(&input[consumed..], &mut out, last);
        consumed += read;
        match result {
            CoderResult::InputEmpty => return out,
            CoderResult::OutputFull => out.reserve(input.len().saturating_sub(consumed) * 3 + 16),
        }
    }
}

fn build_http_client(options: &FetchOptions, jar: &Arc<Jar>) -> Result<Client, TransportError> {
    match try_build_client(options, jar, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic when querying system proxy
            // settings; retry with env proxies only.
            warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(options, jar, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(TransportError::ClientBuild {
                    detail: "client construction panicked while reading proxy settings".to_string(),
                }),
                Err(BuildClientFailure::Build(error)) => Err(TransportError::ClientBuild {
                    detail: error.to_string(),
                }),
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(TransportError::ClientBuild {
            detail: error.to_string(),
        }),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    options: &FetchOptions,
    jar: &Arc<Jar>,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let jar = Arc::clone(jar);
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(options, jar);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(options: &FetchOptions, jar: Arc<Jar>) -> ClientBuilder {
    Client::builder()
        .connect_timeout(options.connect_timeout)
        .read_timeout(options.read_timeout)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .cookie_provider(jar)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    let names: &[&str] = match scheme {
        "https" => &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"],
        "http" => &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"],
        _ => return None,
    };
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
