use tracing::debug;

use crate::node::NodeClient;

pub const GWEI: u128 = 1_000_000_000;

/// Fee cap used when neither an override nor a node suggestion is available.
pub const DEFAULT_FEE_CAP: u128 = 10 * GWEI;

/// Tip assumed by the offline fee derivation.
pub const OFFLINE_TIP_CAP: u128 = GWEI;

/// Blob fee cap used when the node cannot report a blob base fee.
pub const DEFAULT_BLOB_FEE_CAP: u128 = GWEI;

/// Caller-supplied fee parameters. `None` means "ask the node".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeOverrides {
    pub fee_cap: Option<u128>,
    pub tip_cap: Option<u128>,
}

impl FeeOverrides {
    pub fn fixed(fee_cap: u128, tip_cap: u128) -> Self {
        Self {
            fee_cap: Some(fee_cap),
            tip_cap: Some(tip_cap),
        }
    }
}

/// Resolved EIP-1559 fee parameters. Constructors keep `tip_cap <= fee_cap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeCaps {
    pub fee_cap: u128,
    pub tip_cap: u128,
}

impl FeeCaps {
    pub fn clamped(fee_cap: u128, tip_cap: u128) -> Self {
        Self {
            fee_cap,
            tip_cap: tip_cap.min(fee_cap),
        }
    }

    /// Derives caps without a node: a 1 gwei tip carved out of `default_fee_cap`, or no
    /// tip at all if the default cannot cover it.
    pub fn offline(default_fee_cap: u128) -> Self {
        if default_fee_cap >= OFFLINE_TIP_CAP {
            Self::clamped(default_fee_cap - OFFLINE_TIP_CAP, OFFLINE_TIP_CAP)
        } else {
            Self {
                fee_cap: default_fee_cap,
                tip_cap: 0,
            }
        }
    }
}

/// Resolves fee caps for one transaction.
///
/// Explicit overrides win. Missing values are queried from `node`; a failed query (or no
/// node at all) falls back to [`FeeCaps::offline`]. The tip is always clamped to the fee cap.
pub async fn get_caps(
    node: Option<&dyn NodeClient>,
    default_fee_cap: u128,
    overrides: FeeOverrides,
) -> FeeCaps {
    let (fee_cap, tip_cap) = match node {
        Some(node) => {
            let fee_cap = match overrides.fee_cap {
                Some(fee_cap) => Some(fee_cap),
                None => node
                    .suggest_fee_cap()
                    .await
                    .inspect_err(|e| debug!("fee cap suggestion failed: {e}"))
                    .ok(),
            };
            let tip_cap = match overrides.tip_cap {
                Some(tip_cap) => Some(tip_cap),
                None => node
                    .suggest_tip_cap()
                    .await
                    .inspect_err(|e| debug!("tip cap suggestion failed: {e}"))
                    .ok(),
            };
            (fee_cap, tip_cap)
        }
        None => (overrides.fee_cap, overrides.tip_cap),
    };

    match (fee_cap, tip_cap) {
        (Some(fee_cap), Some(tip_cap)) => FeeCaps::clamped(fee_cap, tip_cap),
        (Some(fee_cap), None) => FeeCaps::offline(fee_cap),
        (None, Some(tip_cap)) => {
            FeeCaps::clamped(FeeCaps::offline(default_fee_cap).fee_cap, tip_cap)
        }
        (None, None) => FeeCaps::offline(default_fee_cap),
    }
}

/// Blob fee cap: twice the current blob base fee, or [`DEFAULT_BLOB_FEE_CAP`].
pub async fn blob_fee_cap(node: &dyn NodeClient) -> u128 {
    match node.suggest_blob_fee().await {
        Ok(fee) => fee.saturating_mul(2).max(1),
        Err(e) => {
            debug!("blob fee suggestion failed: {e}");
            DEFAULT_BLOB_FEE_CAP
        }
    }
}
