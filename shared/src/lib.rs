// SPDX-License-Identifier: MIT

/////////////////////////////////////////////////////////////////////////////
//SHARED MODULES//
/////////////////////////////////////////////////////////////////////////////

// Re‑export the tracing crate so macros can use `$crate::tracing::…`
pub use tracing;

pub mod log;

pub mod error {
    use thiserror::Error;

    /// Which side of the verification a failure belongs to. Every failure
    /// carries one of these so the diagnostic names the failing chain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Chain {
        Source,
        Destination,
    }

    impl std::fmt::Display for Chain {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Chain::Source => write!(f, "Source"),
                Chain::Destination => write!(f, "Destination"),
            }
        }
    }

    /// Everything that can abort a verification run. Mismatch is a verdict,
    /// not an error, and never appears here.
    #[derive(Debug, Error)]
    pub enum VerifyError {
        #[error("Invalid Ethereum address format.")]
        InvalidAddress,

        #[error("Invalid block reference: {0}")]
        InvalidBlockRef(String),

        #[error("{chain} RPC connection failed.")]
        Connectivity { chain: Chain },

        #[error("{chain} RPC request failed: {reason}")]
        Rpc { chain: Chain, reason: String },

        #[error("{chain} chain: No code found at this address.")]
        Absent { chain: Chain },
    }

    impl VerifyError {
        /// Process exit status for this failure. Input and transport problems
        /// exit 1; a missing contract exits 2, same as a hash mismatch.
        pub fn exit_code(&self) -> u8 {
            match self {
                VerifyError::InvalidAddress
                | VerifyError::InvalidBlockRef(_)
                | VerifyError::Connectivity { .. }
                | VerifyError::Rpc { .. } => 1,
                VerifyError::Absent { .. } => 2,
            }
        }
    }
}

pub mod utils {
    use clap::{Arg, ArgAction, Command};
    use tiny_keccak::{Hasher, Keccak};

    /// -------------------------------------------
    /// Hashes a byte slice using the Keccak256 algorithm.
    /// -------------------------------------------
    pub fn keccak256(input: &[u8]) -> [u8; 32] {
        let mut hasher = Keccak::v256();
        let mut output = [0u8; 32];

        hasher.update(input);
        hasher.finalize(&mut output);

        output
    }

    /// -------------------------------------------
    /// Renders the canonical fingerprint of deployed bytecode:
    /// the 0x-prefixed hex of its keccak256 digest.
    /// -------------------------------------------
    pub fn code_hash(code: &[u8]) -> String {
        format!("0x{}", hex::encode(keccak256(code)))
    }

    /// Case-insensitive equality of two hex digests. Both sides come from the
    /// same hash function, so case folding is the only normalization needed.
    pub fn hashes_match(a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    /// -------------------------------------------
    /// Builds the CLI definition for the verifier binary.
    /// -------------------------------------------
    pub fn cli_command() -> Command {
        Command::new("bytecode-crosschain-soundness")
            .version("1.0")
            .about("Verifies that a contract carries identical bytecode on two chains by comparing keccak256 hashes of the deployed code")
            .arg(Arg::new("src-rpc")
                .long("src-rpc")
                .value_name("URL")
                .help("Source chain RPC URL (default from SRC_RPC_URL)"))
            .arg(Arg::new("dst-rpc")
                .long("dst-rpc")
                .value_name("URL")
                .help("Destination chain RPC URL (default from DST_RPC_URL)"))
            .arg(Arg::new("address")
                .short('a')
                .long("address")
                .value_name("ADDRESS")
                .help("Contract address to check")
                .required(true))
            .arg(Arg::new("src-block")
                .long("src-block")
                .value_name("BLOCK")
                .help("Block tag/number on the source chain")
                .default_value("latest"))
            .arg(Arg::new("dst-block")
                .long("dst-block")
                .value_name("BLOCK")
                .help("Block tag/number on the destination chain")
                .default_value("latest"))
            .arg(Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Per-request RPC timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("30"))
            .arg(Arg::new("json")
                .long("json")
                .help("Also emit the result as a JSON record")
                .action(ArgAction::SetTrue))
            .arg(Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue))
    }

    /// Parses CLI arguments and returns the matches.
    pub fn parse_cli_args_verifier() -> clap::ArgMatches {
        cli_command().get_matches()
    }
}
