//! Wallet capability injected into the swap flow.
//!
//! Key management and signing live in an external provider; the crate only
//! hands it raw transaction bytes and gets signed bytes back.

use crate::errors::Result;
use async_trait::async_trait;

#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Address of the authenticated wallet, if any.
    fn address(&self) -> Option<String>;

    async fn login(&self) -> Result<()>;

    async fn logout(&self) -> Result<()>;

    /// Sign a serialized transaction and return the signed serialization.
    async fn sign_transaction(&self, transaction: &[u8]) -> Result<Vec<u8>>;
}

/// Shortened address for status lines, e.g. `So111111...11111112`.
pub fn short_address(address: &str) -> String {
    if address.len() <= 16 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..8], &address[address.len() - 8..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_keeps_both_ends() {
        assert_eq!(
            short_address("So11111111111111111111111111111111111111112"),
            "So111111...11111112"
        );
        assert_eq!(short_address("abc"), "abc");
    }
}
