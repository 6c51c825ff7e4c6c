// SPDX-License-Identifier: MIT

//! Console rendering of a finished run and the verdict-to-exit-code mapping.

use shared::log_error;

use crate::verify::{VerificationReport, VerifyOptions};

/// Run banner, printed once inputs are resolved and before network activity.
pub fn print_banner(opts: &VerifyOptions) {
    println!("🔧 bytecode-crosschain-soundness");
    println!("🌐 Source RPC: {}", opts.src_rpc);
    println!("🌐 Destination RPC: {}", opts.dst_rpc);
    println!("🏷️ Address: {}", opts.address);
    println!("⛓️ Source Block: {}", opts.src_block);
    println!("⛓️ Destination Block: {}", opts.dst_block);
}

/// Prints the human-readable summary and, when requested, one JSON record
/// with the full result.
pub fn print_report(report: &VerificationReport, as_json: bool) {
    println!("🔹 Source bytecode hash: {}", report.src_hash);
    println!("🔸 Destination bytecode hash: {}", report.dst_hash);

    let status = if report.matched {
        "✅ MATCH"
    } else {
        "❌ MISMATCH"
    };
    println!("🧩 Cross-chain bytecode comparison result: {status}");
    println!("⏱️ Completed in {:.2}s", report.elapsed_seconds);

    if as_json {
        match serde_json::to_string_pretty(report) {
            Ok(record) => println!("{record}"),
            Err(err) => log_error!("failed to serialize result: {err}"),
        }
    }
}

/// A finished comparison exits 0 on match and 2 on mismatch.
pub fn verdict_exit_code(report: &VerificationReport) -> u8 {
    if report.matched {
        0
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_verdict(matched: bool) -> VerificationReport {
        VerificationReport {
            address: "0x4838B106FCe9647Bdf1E7877BF73cE8B0BAD5f97".to_string(),
            src_rpc: "http://localhost:8545".to_string(),
            dst_rpc: "http://localhost:8546".to_string(),
            src_block: "latest".to_string(),
            dst_block: "latest".to_string(),
            src_hash: "0xaa".to_string(),
            dst_hash: "0xbb".to_string(),
            matched,
            elapsed_seconds: 0.01,
        }
    }

    #[test]
    fn match_exits_zero_mismatch_exits_two() {
        assert_eq!(verdict_exit_code(&report_with_verdict(true)), 0);
        assert_eq!(verdict_exit_code(&report_with_verdict(false)), 2);
    }
}
