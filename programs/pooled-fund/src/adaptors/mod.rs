use anchor_lang::prelude::*;

use crate::errors::FundError;

pub mod custody;
pub mod debt;
pub mod holding;
pub mod lending;
pub mod staking;

pub use custody::*;
pub use debt::*;
pub use holding::*;
pub use lending::*;
pub use staking::*;

/// Closed set of adaptor implementations a fund can delegate to.
///
/// Every position is an (adaptor, config) pair; the config bytes are opaque to
/// the fund and decoded by the adaptor itself.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AdaptorId {
    /// Idle token balance held directly by the fund
    Holding,
    /// Supplied balance in a lending market
    Lending,
    /// Borrowed balance in a lending market
    Debt,
    /// Staked balance, only movable by the strategist
    Staking,
}

/// Who asked for a position-mutating operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Initiator {
    /// A depositor joining or exiting through the fund
    User,
    /// The strategist inside a rebalance batch
    Strategist,
}

/// Identity of one position: the adaptor plus its encoded configuration
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PositionKey {
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
}

impl PositionKey {
    pub fn new(adaptor: AdaptorId, config: Vec<u8>) -> Self {
        Self { adaptor, config }
    }

    /// Holding position for `asset`
    pub fn holding(asset: Pubkey) -> Result<Self> {
        Ok(Self::new(AdaptorId::Holding, encode_config(&HoldingConfig { asset })?))
    }

    /// Market-backed position (lending, debt or staking)
    pub fn market(adaptor: AdaptorId, market: Pubkey, asset: Pubkey) -> Result<Self> {
        Ok(Self::new(adaptor, encode_config(&MarketConfig { market, asset })?))
    }
}

/// Config for `AdaptorId::Holding`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldingConfig {
    pub asset: Pubkey,
}

/// Config for market-backed adaptors
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketConfig {
    pub market: Pubkey,
    pub asset: Pubkey,
}

pub fn encode_config<T: AnchorSerialize>(config: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    config
        .serialize(&mut bytes)
        .map_err(|_| error!(FundError::InvalidPositionConfig))?;
    Ok(bytes)
}

pub fn decode_config<T: AnchorDeserialize>(bytes: &[u8]) -> Result<T> {
    T::try_from_slice(bytes).map_err(|_| error!(FundError::InvalidPositionConfig))
}

/// Contract every position integration satisfies.
///
/// Adaptors are stateless: they run with the fund's identity and only ever
/// read or mutate the fund's own `Custody` record.
pub trait PositionAdaptor {
    fn id(&self) -> AdaptorId;

    fn is_debt(&self) -> bool {
        false
    }

    fn asset_of(&self, config: &[u8]) -> Result<Pubkey>;

    fn balance_of(&self, config: &[u8], custody: &Custody) -> Result<u64>;

    /// Portion of the balance that can leave the position right now
    fn withdrawable_from(&self, config: &[u8], custody: &Custody) -> Result<u64>;

    fn deposit(
        &self,
        amount: u64,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()>;

    fn withdraw(
        &self,
        amount: u64,
        receiver: Pubkey,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()>;

    fn key(&self, config: &[u8]) -> PositionKey {
        PositionKey::new(self.id(), config.to_vec())
    }
}

/// Resolve an adaptor id to its implementation
pub fn adaptor_for(id: AdaptorId) -> &'static dyn PositionAdaptor {
    match id {
        AdaptorId::Holding => &HoldingAdaptor,
        AdaptorId::Lending => &LendingAdaptor,
        AdaptorId::Debt => &DebtAdaptor,
        AdaptorId::Staking => &StakingAdaptor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_encoding_is_exact() {
        let asset = Pubkey::new_unique();
        let key = PositionKey::holding(asset).unwrap();
        let decoded: HoldingConfig = decode_config(&key.config).unwrap();
        assert_eq!(decoded.asset, asset);

        // Trailing bytes are not a valid holding config
        let mut padded = key.config.clone();
        padded.push(0);
        assert!(decode_config::<HoldingConfig>(&padded).is_err());
    }

    #[test]
    fn test_dispatch_matches_id() {
        for id in [
            AdaptorId::Holding,
            AdaptorId::Lending,
            AdaptorId::Debt,
            AdaptorId::Staking,
        ] {
            assert_eq!(adaptor_for(id).id(), id);
        }
        assert!(adaptor_for(AdaptorId::Debt).is_debt());
        assert!(!adaptor_for(AdaptorId::Lending).is_debt());
    }
}
