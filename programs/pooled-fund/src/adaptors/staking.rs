use anchor_lang::prelude::*;

use crate::adaptors::{decode_config, AdaptorId, Custody, Initiator, MarketConfig, PositionAdaptor};
use crate::errors::FundError;

/// Staked balance in a staking pool.
///
/// Never withdrawable by depositors; the strategist stakes from and unstakes
/// into the wallet.
pub struct StakingAdaptor;

impl PositionAdaptor for StakingAdaptor {
    fn id(&self) -> AdaptorId {
        AdaptorId::Staking
    }

    fn asset_of(&self, config: &[u8]) -> Result<Pubkey> {
        Ok(decode_config::<MarketConfig>(config)?.asset)
    }

    fn balance_of(&self, config: &[u8], custody: &Custody) -> Result<u64> {
        Ok(custody.book_balance(&self.key(config)))
    }

    fn withdrawable_from(&self, _config: &[u8], _custody: &Custody) -> Result<u64> {
        Ok(0)
    }

    fn deposit(
        &self,
        amount: u64,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()> {
        require!(
            initiator == Initiator::Strategist,
            FundError::UserOperationNotPermitted
        );
        custody.debit_wallet(&self.asset_of(config)?, amount)?;
        custody.credit_book(&self.key(config), amount)
    }

    fn withdraw(
        &self,
        amount: u64,
        receiver: Pubkey,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()> {
        require!(
            initiator == Initiator::Strategist,
            FundError::UserOperationNotPermitted
        );
        custody.debit_book(&self.key(config), amount)?;
        custody.send(receiver, self.asset_of(config)?, amount)
    }
}
