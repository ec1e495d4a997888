// Copyright 2024. The Tari Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::*;
use reqwest::Client;
use url::Url;

use crate::error::TipScrapeError;

const LOG_TARGET: &str = "clio::topology_sync::prometheus";

/// The metric under which a Cardano node exposes its current block number.
pub const DEFAULT_BLOCK_NUMBER_METRIC: &str = "cardano_node_metrics_blockNum_int";

/// Source of the current block number of the local node.
#[async_trait]
pub trait TipSource: Send + Sync {
    async fn current_block_number(&self) -> Result<u64, TipScrapeError>;
}

#[async_trait]
impl<T: TipSource + ?Sized> TipSource for Arc<T> {
    async fn current_block_number(&self) -> Result<u64, TipScrapeError> {
        (**self).current_block_number().await
    }
}

/// Scrapes the block number from the node's prometheus endpoint.
#[derive(Debug, Clone)]
pub struct PrometheusTipSource {
    endpoint: Url,
    metric: String,
    client: Client,
}

impl PrometheusTipSource {
    pub fn new(endpoint: Url, metric: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().connect_timeout(timeout).timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            metric,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TipSource for PrometheusTipSource {
    async fn current_block_number(&self) -> Result<u64, TipScrapeError> {
        trace!(target: LOG_TARGET, "Scraping {}", self.endpoint);
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(TipScrapeError::Unreachable)?;
        let body = response.text().await.map_err(TipScrapeError::Body)?;
        parse_block_number(&body, &self.metric)
    }
}

/// Finds `metric` in a prometheus text exposition.
///
/// Only lines of the form `<name> <value>` are considered.
pub fn parse_block_number(body: &str, metric: &str) -> Result<u64, TipScrapeError> {
    let value = body
        .lines()
        .filter_map(|line| {
            let mut fields = line.split(' ');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(value), None) => Some((name, value)),
                _ => None,
            }
        })
        .find_map(|(name, value)| (name == metric).then_some(value))
        .ok_or_else(|| TipScrapeError::MissingMetric(metric.to_string()))?;

    value.parse().map_err(|_| TipScrapeError::InvalidValue {
        metric: metric.to_string(),
        value: value.to_string(),
    })
}
