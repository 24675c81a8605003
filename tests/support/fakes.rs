//! In-memory stand-ins for the design API and asset storage.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use figma_icons_core::download::AssetStream;
use figma_icons_core::{
    ApiError, AssetFetcher, DesignApi, DocumentNode, DownloadError, ImageFormat, NodeType,
};
use futures_util::StreamExt;
use futures_util::stream;

pub fn document(pages: Vec<DocumentNode>) -> DocumentNode {
    DocumentNode::new("0:0", "Document", NodeType::Document).with_children(pages)
}

pub fn page(id: &str, name: &str, children: Vec<DocumentNode>) -> DocumentNode {
    DocumentNode::new(id, name, NodeType::Canvas).with_children(children)
}

pub fn frame(id: &str, name: &str, children: Vec<DocumentNode>) -> DocumentNode {
    DocumentNode::new(id, name, NodeType::Frame).with_children(children)
}

pub fn component(id: &str, name: &str) -> DocumentNode {
    DocumentNode::new(id, name, NodeType::Component)
}

/// Serves a fixed document and resolves every id to `fake://<id>`.
pub struct FakeDesignApi {
    document: DocumentNode,
    unrenderable: HashSet<String>,
    fail_resolution: bool,
    pub tree_calls: AtomicUsize,
    pub resolution_calls: Mutex<Vec<Vec<String>>>,
}

impl FakeDesignApi {
    pub fn new(document: DocumentNode) -> Self {
        Self {
            document,
            unrenderable: HashSet::new(),
            fail_resolution: false,
            tree_calls: AtomicUsize::new(0),
            resolution_calls: Mutex::new(Vec::new()),
        }
    }

    /// Ids the service answers with `null`.
    pub fn with_unrenderable(mut self, ids: &[&str]) -> Self {
        self.unrenderable = ids.iter().map(|id| (*id).to_string()).collect();
        self
    }

    /// Every resolution request fails.
    pub fn failing_resolution(mut self) -> Self {
        self.fail_resolution = true;
        self
    }

    pub fn url_for(id: &str) -> String {
        format!("fake://{id}")
    }
}

#[async_trait]
impl DesignApi for FakeDesignApi {
    async fn fetch_document_tree(&self, _file_id: &str) -> Result<DocumentNode, ApiError> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.document.clone())
    }

    async fn resolve_image_urls(
        &self,
        _file_id: &str,
        ids: &[String],
        _format: ImageFormat,
    ) -> Result<HashMap<String, Option<String>>, ApiError> {
        self.resolution_calls
            .lock()
            .expect("resolution log poisoned")
            .push(ids.to_vec());
        if self.fail_resolution {
            return Err(ApiError::Api {
                url: "fake://images".to_string(),
                message: "render timeout".to_string(),
            });
        }
        Ok(ids
            .iter()
            .map(|id| {
                let url = (!self.unrenderable.contains(id)).then(|| Self::url_for(id));
                (id.clone(), url)
            })
            .collect())
    }
}

/// Streams `<svg id="<url>"/>` for any URL, failing scripted URLs first.
#[derive(Default)]
pub struct FakeAssetFetcher {
    failures_left: Mutex<HashMap<String, usize>>,
    cut_offs_left: Mutex<HashMap<String, usize>>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub total_calls: AtomicUsize,
}

impl FakeAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `times` fetches of `url` fail with HTTP 503.
    pub fn fail(self, url: &str, times: usize) -> Self {
        self.failures_left
            .lock()
            .expect("failure script poisoned")
            .insert(url.to_string(), times);
        self
    }

    /// The next `times` fetches of `url` open, send half the body, then fail.
    pub fn cut_off(self, url: &str, times: usize) -> Self {
        self.cut_offs_left
            .lock()
            .expect("cut-off script poisoned")
            .insert(url.to_string(), times);
        self
    }

    /// Every fetch waits this long before returning its stream.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls
            .lock()
            .expect("call log poisoned")
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn body_for(url: &str) -> String {
        format!("<svg id=\"{url}\"/>")
    }
}

#[async_trait]
impl AssetFetcher for FakeAssetFetcher {
    async fn fetch_stream(&self, url: &str) -> Result<AssetStream, DownloadError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .expect("call log poisoned")
            .entry(url.to_string())
            .or_insert(0) += 1;

        if let Some(latency) = self.latency {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        if take_scripted(&self.failures_left, url) {
            return Err(DownloadError::http_status(url, 503));
        }

        let body = Self::body_for(url).into_bytes();
        let (head, tail) = body.split_at(body.len() / 2);
        let second = if take_scripted(&self.cut_offs_left, url) {
            Err(DownloadError::stream(url, "connection reset"))
        } else {
            Ok(Bytes::copy_from_slice(tail))
        };
        let chunks: Vec<Result<Bytes, DownloadError>> =
            vec![Ok(Bytes::copy_from_slice(head)), second];
        Ok(stream::iter(chunks).boxed())
    }
}

/// Consumes one scripted failure for `url`, if any are left.
fn take_scripted(script: &Mutex<HashMap<String, usize>>, url: &str) -> bool {
    let mut script = script.lock().expect("fetch script poisoned");
    match script.get_mut(url) {
        Some(left) if *left > 0 => {
            *left -= 1;
            true
        }
        _ => false,
    }
}
