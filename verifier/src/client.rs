// SPDX-License-Identifier: MIT

//! Chain endpoint capability: the narrow read-only surface the verifier
//! needs from a node, plus the alloy-backed HTTP implementation.

use std::time::Duration;

use alloy::{
    eips::{BlockId, BlockNumberOrTag},
    primitives::Address,
    providers::{Provider, RootProvider},
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tokio::time::timeout;
use url::Url;

use shared::error::VerifyError;

/// Read-only view of one chain. Narrow on purpose so tests can stand in a
/// double that simulates absence, mismatch and connectivity failure.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Probes the endpoint with a cheap request.
    async fn is_connected(&self) -> bool;

    /// Returns the deployed bytecode at `address` as observed at `block`.
    /// Empty bytes mean no contract lives there; transport faults are errors.
    async fn get_code(&self, address: Address, block: BlockId) -> anyhow::Result<Vec<u8>>;
}

/// HTTP JSON-RPC endpoint handle. Immutable after construction; one per
/// chain per run, never shared between chains.
pub struct EthEndpoint {
    provider: RootProvider,
    timeout: Duration,
}

impl EthEndpoint {
    pub fn connect(rpc_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let url: Url = rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL: {rpc_url}"))?;
        Ok(Self {
            provider: RootProvider::new_http(url),
            timeout: request_timeout,
        })
    }
}

#[async_trait]
impl ChainClient for EthEndpoint {
    async fn is_connected(&self) -> bool {
        matches!(
            timeout(self.timeout, self.provider.get_chain_id()).await,
            Ok(Ok(_))
        )
    }

    async fn get_code(&self, address: Address, block: BlockId) -> anyhow::Result<Vec<u8>> {
        let code = timeout(self.timeout, self.provider.get_code_at(address).block_id(block))
            .await
            .map_err(|_| anyhow!("request timed out after {}s", self.timeout.as_secs()))?
            .context("eth_getCode request failed")?;
        Ok(code.to_vec())
    }
}

/// Maps a user-supplied block reference to the identifier the endpoint
/// expects. Tags, decimal heights and 0x-prefixed hex heights are accepted.
pub fn parse_block_ref(block: &str) -> Result<BlockId, VerifyError> {
    let tag = match block.trim().to_ascii_lowercase().as_str() {
        "latest" => BlockNumberOrTag::Latest,
        "earliest" => BlockNumberOrTag::Earliest,
        "pending" => BlockNumberOrTag::Pending,
        "finalized" => BlockNumberOrTag::Finalized,
        "safe" => BlockNumberOrTag::Safe,
        raw => {
            let number = if let Some(hex) = raw.strip_prefix("0x") {
                u64::from_str_radix(hex, 16)
            } else {
                raw.parse::<u64>()
            };
            match number {
                Ok(n) => BlockNumberOrTag::Number(n),
                Err(_) => return Err(VerifyError::InvalidBlockRef(block.to_string())),
            }
        }
    };
    Ok(BlockId::Number(tag))
}
