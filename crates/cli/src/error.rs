use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("invalid faucet key")]
    #[diagnostic(help("pass a 32-byte hex private key with --sk"))]
    FaucetKey(#[source] txfuzz_core::Error),

    #[error("failed to load corpus from {path}")]
    Corpus {
        path: String,
        #[source]
        source: txfuzz_core::Error,
    },

    #[error("could not reach the node")]
    #[diagnostic(help("check that --rpc points at a running node"))]
    Node(#[source] txfuzz_core::Error),

    #[error("core error")]
    Core(#[from] txfuzz_core::Error),
}

impl CliError {
    /// Wraps a core error, singling out failures that came back from the node.
    pub fn from_run(err: txfuzz_core::Error) -> Self {
        if err.is_connectivity() {
            Self::Node(err)
        } else {
            Self::Core(err)
        }
    }
}
