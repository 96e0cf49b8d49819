//! services/client/src/adapters/transfer.rs
//!
//! Direct-to-storage upload adapter: streams a local file to a pre-signed
//! URL with a plain PUT, reporting byte-level progress as chunks are read.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::debug;

use lep_inspect_core::ports::{FileTransfer, PortError, PortResult};

const CHUNK_SIZE: usize = 64 * 1024;

pub struct HttpFileTransfer {
    http: reqwest::Client,
}

impl HttpFileTransfer {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFileTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileTransfer for HttpFileTransfer {
    async fn put_file(
        &self,
        upload_url: &str,
        path: &Path,
        progress: &mut (dyn FnMut(u64, u64) + Send),
    ) -> PortResult<()> {
        let total = tokio::fs::metadata(path)
            .await
            .map_err(|e| PortError::Storage(format!("{}: {e}", path.display())))?
            .len();
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| PortError::Storage(format!("{}: {e}", path.display())))?;

        // The request body must own everything it captures (reqwest wants a
        // 'static stream), but the progress callback is borrowed. Bridge the
        // two with a channel: the stream sends byte counts, the select loop
        // below drives the callback while the request is in flight.
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let body_stream = async_stream::stream! {
            let mut sent: u64 = 0;
            let mut buf = vec![0u8; CHUNK_SIZE];
            loop {
                match file.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        sent += n as u64;
                        let _ = tx.send(sent);
                        yield Ok::<Bytes, std::io::Error>(Bytes::copy_from_slice(&buf[..n]));
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        debug!(url = upload_url, total, "uploading file");
        let request = self
            .http
            .put(upload_url)
            .header(header::CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(body_stream))
            .send();
        tokio::pin!(request);

        let mut rx_done = false;
        let response = loop {
            tokio::select! {
                maybe = rx.recv(), if !rx_done => {
                    match maybe {
                        Some(sent) => progress(sent, total),
                        None => rx_done = true,
                    }
                }
                result = &mut request => {
                    break result.map_err(|e| PortError::Network(e.to_string()))?;
                }
            }
        };
        // Report any counts still queued when the request finished first.
        while let Ok(sent) = rx.try_recv() {
            progress(sent, total);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::RequestFailed(status.as_u16()));
        }
        Ok(())
    }
}
