use std::fmt;
use std::str::FromStr;

use ethers::prelude::k256::SecretKey;
use ethers::signers::{LocalWallet, Signer};

use crate::error::ConfigError;
use crate::types::ChainId;

#[derive(Clone)]
pub struct PrivateKey {
    pub key: SecretKey,
}

impl PrivateKey {
    pub fn wallet(&self, chain_id: ChainId) -> LocalWallet {
        LocalWallet::from(self.key.clone()).with_chain_id(chain_id.0)
    }
}

impl FromStr for PrivateKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("0x");

        let bytes = hex::decode(s)
            .map_err(|err| ConfigError::InvalidKey(err.to_string()))?;

        let key = SecretKey::from_slice(&bytes)
            .map_err(|_| ConfigError::InvalidKey("not a secp256k1 scalar".into()))?;

        Ok(Self { key })
    }
}

// Keys end up in logs through `?` and `{:?}`, never print the scalar.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ethers::types::Address;

    use super::*;

    // Well known first dev account of hardhat and anvil
    const DEV_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn parses_with_and_without_prefix() -> eyre::Result<()> {
        let with_prefix: PrivateKey = DEV_KEY.parse()?;
        let without_prefix: PrivateKey = DEV_KEY[2..].parse()?;

        assert_eq!(with_prefix.key.to_bytes(), without_prefix.key.to_bytes());

        Ok(())
    }

    #[test]
    fn derives_dev_account_address() -> eyre::Result<()> {
        let key: PrivateKey = DEV_KEY.parse()?;
        let wallet = key.wallet(ChainId(1337));

        let expected: Address =
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse()?;

        assert_eq!(wallet.address(), expected);
        assert_eq!(wallet.chain_id(), 1337);

        Ok(())
    }

    #[test]
    fn rejects_placeholders() {
        assert!(matches!(
            "Private Key Here".parse::<PrivateKey>(),
            Err(ConfigError::InvalidKey(_))
        ));
        assert!(matches!(
            "0x1234".parse::<PrivateKey>(),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_output_is_redacted() -> eyre::Result<()> {
        let key: PrivateKey = DEV_KEY.parse()?;

        let debug = format!("{key:?}");

        assert!(!debug.contains(&DEV_KEY[2..10]));

        Ok(())
    }
}
