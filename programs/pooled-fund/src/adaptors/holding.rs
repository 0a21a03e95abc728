use anchor_lang::prelude::*;

use crate::adaptors::{decode_config, AdaptorId, Custody, HoldingConfig, Initiator, PositionAdaptor};
use crate::errors::FundError;

/// Idle tokens sitting in the fund wallet.
///
/// The only adaptor that accepts user deposits directly: incoming tokens land
/// in the fund's token account and are credited to the wallet. The balance
/// follows that token account through `Fund::observe_holdings`. Anyone acting through the fund may send wallet
/// tokens out; the rebalance guard bounds what the strategist can do with that.
pub struct HoldingAdaptor;

impl PositionAdaptor for HoldingAdaptor {
    fn id(&self) -> AdaptorId {
        AdaptorId::Holding
    }

    fn asset_of(&self, config: &[u8]) -> Result<Pubkey> {
        Ok(decode_config::<HoldingConfig>(config)?.asset)
    }

    fn balance_of(&self, config: &[u8], custody: &Custody) -> Result<u64> {
        Ok(custody.wallet_balance(&self.asset_of(config)?))
    }

    fn withdrawable_from(&self, config: &[u8], custody: &Custody) -> Result<u64> {
        self.balance_of(config, custody)
    }

    fn deposit(
        &self,
        amount: u64,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()> {
        // Strategist-held tokens are already in the wallet
        require!(
            initiator == Initiator::User,
            FundError::StrategistOperationNotPermitted
        );
        custody.receive(self.asset_of(config)?, amount)
    }

    fn withdraw(
        &self,
        amount: u64,
        receiver: Pubkey,
        config: &[u8],
        custody: &mut Custody,
        _initiator: Initiator,
    ) -> Result<()> {
        let asset = self.asset_of(config)?;
        custody.debit_wallet(&asset, amount)?;
        custody.send(receiver, asset, amount)
    }
}
