// SPDX-License-Identifier: MIT

//! Verification orchestrator: validate inputs, probe both endpoints, fetch
//! and hash the code on each side, compare.

use std::time::Instant;

use alloy::primitives::Address;
use serde::Serialize;

use shared::error::{Chain, VerifyError};
use shared::log_debug;
use shared::utils::{code_hash, hashes_match};

use crate::client::{parse_block_ref, ChainClient};

/// User-facing inputs of one run, resolved from CLI and environment.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub address: String,
    pub src_rpc: String,
    pub dst_rpc: String,
    pub src_block: String,
    pub dst_block: String,
}

/// Outcome of a single code lookup. A contract may legitimately not (yet)
/// exist on one chain, so absence is a state of its own, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLookup {
    Present(String),
    Absent,
}

/// Terminal record of one verification run. Field names and order match the
/// JSON record emitted under `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub address: String,
    pub src_rpc: String,
    pub dst_rpc: String,
    pub src_block: String,
    pub dst_block: String,
    pub src_hash: String,
    pub dst_hash: String,
    #[serde(rename = "match")]
    pub matched: bool,
    pub elapsed_seconds: f64,
}

/// Purely syntactic address check. Never touches the network; the parsed
/// value renders in EIP-55 checksummed form.
pub fn validate_address(raw: &str) -> Result<Address, VerifyError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| VerifyError::InvalidAddress)
}

/// Fetches the deployed code on one chain and reduces it to its keccak256
/// fingerprint. Exactly one RPC read; no retries, no caching. Transport
/// faults become `Rpc` errors here so the orchestrator sees tagged kinds only.
pub async fn fetch_code_hash(
    client: &dyn ChainClient,
    chain: Chain,
    address: Address,
    block: &str,
) -> Result<CodeLookup, VerifyError> {
    let block_id = parse_block_ref(block)?;
    let code = client
        .get_code(address, block_id)
        .await
        .map_err(|err| VerifyError::Rpc {
            chain,
            reason: err.to_string(),
        })?;

    if code.is_empty() {
        return Ok(CodeLookup::Absent);
    }
    let hash = code_hash(&code);
    log_debug!("{} code: {} bytes, hash {}", chain, code.len(), hash);
    Ok(CodeLookup::Present(hash))
}

/// Runs the full verification: address validation, connectivity probes in
/// source-then-destination order, both code fetches (issued concurrently,
/// source-side failures reported first), hash comparison.
pub async fn verify(
    src: &dyn ChainClient,
    dst: &dyn ChainClient,
    opts: &VerifyOptions,
) -> Result<VerificationReport, VerifyError> {
    let started = Instant::now();

    let address = validate_address(&opts.address)?;
    parse_block_ref(&opts.src_block)?;
    parse_block_ref(&opts.dst_block)?;

    if !src.is_connected().await {
        return Err(VerifyError::Connectivity { chain: Chain::Source });
    }
    if !dst.is_connected().await {
        return Err(VerifyError::Connectivity {
            chain: Chain::Destination,
        });
    }

    let (src_lookup, dst_lookup) = tokio::join!(
        fetch_code_hash(src, Chain::Source, address, &opts.src_block),
        fetch_code_hash(dst, Chain::Destination, address, &opts.dst_block),
    );

    let src_hash = match src_lookup? {
        CodeLookup::Present(hash) => hash,
        CodeLookup::Absent => return Err(VerifyError::Absent { chain: Chain::Source }),
    };
    let dst_hash = match dst_lookup? {
        CodeLookup::Present(hash) => hash,
        CodeLookup::Absent => {
            return Err(VerifyError::Absent {
                chain: Chain::Destination,
            })
        }
    };

    let matched = hashes_match(&src_hash, &dst_hash);
    let elapsed = started.elapsed().as_secs_f64();

    Ok(VerificationReport {
        address: address.to_string(),
        src_rpc: opts.src_rpc.clone(),
        dst_rpc: opts.dst_rpc.clone(),
        src_block: opts.src_block.clone(),
        dst_block: opts.dst_block.clone(),
        src_hash,
        dst_hash,
        matched,
        // two-decimal precision, same as the printed summary
        elapsed_seconds: (elapsed * 100.0).round() / 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::eips::BlockId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ADDRESS: &str = "0x4838B106FCe9647Bdf1E7877BF73cE8B0BAD5f97";

    /// Test double for one chain: canned connectivity, canned code bytes or a
    /// canned transport failure, and a counter of `get_code` calls.
    struct MockChain {
        connected: bool,
        code: Result<Vec<u8>, String>,
        calls: AtomicUsize,
    }

    impl MockChain {
        fn with_code(code: &[u8]) -> Self {
            Self {
                connected: true,
                code: Ok(code.to_vec()),
                calls: AtomicUsize::new(0),
            }
        }

        fn unreachable_endpoint() -> Self {
            Self {
                connected: false,
                code: Ok(vec![]),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                connected: true,
                code: Err(reason.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn is_connected(&self) -> bool {
            self.connected
        }

        async fn get_code(&self, _address: Address, _block: BlockId) -> anyhow::Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.code {
                Ok(code) => Ok(code.clone()),
                Err(reason) => Err(anyhow::anyhow!(reason.clone())),
            }
        }
    }

    fn opts_for(address: &str) -> VerifyOptions {
        VerifyOptions {
            address: address.to_string(),
            src_rpc: "http://localhost:8545".to_string(),
            dst_rpc: "http://localhost:8546".to_string(),
            src_block: "latest".to_string(),
            dst_block: "latest".to_string(),
        }
    }

    #[tokio::test]
    async fn identical_bytecode_matches() {
        let code = hex::decode("6080604052348015600f57600080fd5b50").unwrap();
        let src = MockChain::with_code(&code);
        let dst = MockChain::with_code(&code);

        let report = verify(&src, &dst, &opts_for(ADDRESS)).await.unwrap();
        assert!(report.matched);
        assert_eq!(report.src_hash, report.dst_hash);
        assert_eq!(report.address, ADDRESS);
        assert_eq!(src.call_count(), 1);
        assert_eq!(dst.call_count(), 1);
    }

    #[tokio::test]
    async fn differing_bytecode_mismatches() {
        let src = MockChain::with_code(&[0x60, 0x80, 0x60, 0x40]);
        let dst = MockChain::with_code(&[0x60, 0x80, 0x60, 0x41]);

        let report = verify(&src, &dst, &opts_for(ADDRESS)).await.unwrap();
        assert!(!report.matched);
        assert_ne!(report.src_hash, report.dst_hash);
    }

    #[tokio::test]
    async fn invalid_address_makes_no_network_call() {
        let src = MockChain::with_code(&[0x00]);
        let dst = MockChain::with_code(&[0x00]);

        let err = verify(&src, &dst, &opts_for("not-an-address"))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidAddress));
        assert_eq!(src.call_count(), 0);
        assert_eq!(dst.call_count(), 0);
    }

    #[tokio::test]
    async fn unreachable_source_reported_before_any_fetch() {
        let src = MockChain::unreachable_endpoint();
        let dst = MockChain::with_code(&[0x00]);

        let err = verify(&src, &dst, &opts_for(ADDRESS)).await.unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Connectivity { chain: Chain::Source }
        ));
        assert_eq!(src.call_count(), 0);
        assert_eq!(dst.call_count(), 0);
    }

    #[tokio::test]
    async fn unreachable_destination_reported() {
        let src = MockChain::with_code(&[0x00]);
        let dst = MockChain::unreachable_endpoint();

        let err = verify(&src, &dst, &opts_for(ADDRESS)).await.unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Connectivity {
                chain: Chain::Destination
            }
        ));
    }

    #[tokio::test]
    async fn empty_destination_code_is_absent_not_mismatch() {
        let src = MockChain::with_code(&[0x60, 0x80]);
        let dst = MockChain::with_code(&[]);

        let err = verify(&src, &dst, &opts_for(ADDRESS)).await.unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Absent {
                chain: Chain::Destination
            }
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn empty_source_code_wins_over_destination() {
        // Both sides empty: the source-side failure is the one reported.
        let src = MockChain::with_code(&[]);
        let dst = MockChain::with_code(&[]);

        let err = verify(&src, &dst, &opts_for(ADDRESS)).await.unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Absent { chain: Chain::Source }
        ));
    }

    #[tokio::test]
    async fn transport_fault_is_rpc_error_not_absence() {
        let src = MockChain::failing("connection reset by peer");
        let dst = MockChain::with_code(&[0x60, 0x80]);

        let err = verify(&src, &dst, &opts_for(ADDRESS)).await.unwrap_err();
        match err {
            VerifyError::Rpc { chain, reason } => {
                assert_eq!(chain, Chain::Source);
                assert!(reason.contains("connection reset"));
            }
            other => panic!("expected Rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_block_ref_fails_before_any_fetch() {
        let src = MockChain::with_code(&[0x00]);
        let dst = MockChain::with_code(&[0x00]);
        let mut opts = opts_for(ADDRESS);
        opts.dst_block = "not-a-block".to_string();

        let err = verify(&src, &dst, &opts).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidBlockRef(_)));
        assert_eq!(src.call_count(), 0);
        assert_eq!(dst.call_count(), 0);
    }

    #[tokio::test]
    async fn report_address_is_checksummed() {
        let code = [0x60, 0x80];
        let src = MockChain::with_code(&code);
        let dst = MockChain::with_code(&code);
        let opts = opts_for("0x4838b106fce9647bdf1e7877bf73ce8b0bad5f97");

        let report = verify(&src, &dst, &opts).await.unwrap();
        assert_eq!(report.address, ADDRESS);
    }

    #[test]
    fn json_record_uses_wire_field_names() {
        let report = VerificationReport {
            address: ADDRESS.to_string(),
            src_rpc: "http://localhost:8545".to_string(),
            dst_rpc: "http://localhost:8546".to_string(),
            src_block: "latest".to_string(),
            dst_block: "latest".to_string(),
            src_hash: code_hash(&[0x60]),
            dst_hash: code_hash(&[0x60]),
            matched: true,
            elapsed_seconds: 0.42,
        };

        let value: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["match"], serde_json::Value::Bool(true));
        assert_eq!(value["src_block"], "latest");
        assert_eq!(value["elapsed_seconds"], 0.42);
    }
}
