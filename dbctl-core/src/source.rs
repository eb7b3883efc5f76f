//! Components source acquisition
//!
//! Reads the raw components document from stdin, a remote URL or a local
//! file. Each source is read to completion; any failure yields no bytes.

use crate::request::SourceLocator;
use crate::{Error, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

pub struct SourceLoader {
    client: reqwest::Client,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Read the whole document behind `locator`.
    ///
    /// `stdin` is only touched for [`SourceLocator::Stdin`].
    pub async fn load<R>(&self, locator: &SourceLocator, stdin: &mut R) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let fail = |reason: String| Error::SourceAcquisition {
            locator: locator.to_string(),
            reason,
        };

        let data = match locator {
            SourceLocator::Stdin => {
                let mut buf = Vec::new();
                stdin
                    .read_to_end(&mut buf)
                    .await
                    .map_err(|e| fail(e.to_string()))?;
                buf
            }
            SourceLocator::Remote(url) => self.fetch(url).await.map_err(|e| fail(e.to_string()))?,
            SourceLocator::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| fail(e.to_string()))?,
        };

        tracing::debug!(source = %locator, bytes = data.len(), "components document loaded");
        Ok(data)
    }

    // the connection is released when the response is dropped, success or not
    async fn fetch(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
