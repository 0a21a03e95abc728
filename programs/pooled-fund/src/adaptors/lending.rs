use anchor_lang::prelude::*;

use crate::adaptors::{decode_config, AdaptorId, Custody, Initiator, MarketConfig, PositionAdaptor};
use crate::errors::FundError;

/// Supplied balance in a lending market.
///
/// Only the strategist supplies, out of the wallet. Withdrawals are limited
/// by what the market can release (`locked` marks supplied tokens currently
/// lent out).
pub struct LendingAdaptor;

impl PositionAdaptor for LendingAdaptor {
    fn id(&self) -> AdaptorId {
        AdaptorId::Lending
    }

    fn asset_of(&self, config: &[u8]) -> Result<Pubkey> {
        Ok(decode_config::<MarketConfig>(config)?.asset)
    }

    fn balance_of(&self, config: &[u8], custody: &Custody) -> Result<u64> {
        Ok(custody.book_balance(&self.key(config)))
    }

    fn withdrawable_from(&self, config: &[u8], custody: &Custody) -> Result<u64> {
        Ok(custody
            .book(&self.key(config))
            .map_or(0, |b| b.balance.saturating_sub(b.locked)))
    }

    fn deposit(
        &self,
        amount: u64,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()> {
        // Users join through the holding position only
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
        _initiator: Initiator,
    ) -> Result<()> {
        require!(
            amount <= self.withdrawable_from(config, custody)?,
            FundError::InsufficientLiquidity
        );
        custody.debit_book(&self.key(config), amount)?;
        custody.send(receiver, self.asset_of(config)?, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategist_supply_and_withdraw() {
        let fund = Pubkey::new_unique();
        let asset = Pubkey::new_unique();
        let config = crate::adaptors::PositionKey::market(AdaptorId::Lending, Pubkey::new_unique(), asset)
            .unwrap()
            .config;
        let mut custody = Custody::new(fund);
        custody.credit_wallet(asset, 1_000).unwrap();

        LendingAdaptor
            .deposit(600, &config, &mut custody, Initiator::Strategist)
            .unwrap();
        assert_eq!(custody.wallet_balance(&asset), 400);
        assert_eq!(LendingAdaptor.balance_of(&config, &custody).unwrap(), 600);

        custody
            .report_book(&LendingAdaptor.key(&config), 600, 500)
            .unwrap();
        assert_eq!(LendingAdaptor.withdrawable_from(&config, &custody).unwrap(), 100);
        assert!(LendingAdaptor
            .withdraw(101, fund, &config, &mut custody, Initiator::Strategist)
            .is_err());

        LendingAdaptor
            .withdraw(100, fund, &config, &mut custody, Initiator::Strategist)
            .unwrap();
        assert_eq!(custody.wallet_balance(&asset), 500);
    }

    #[test]
    fn test_users_cannot_supply() {
        let asset = Pubkey::new_unique();
        let config = crate::adaptors::PositionKey::market(AdaptorId::Lending, Pubkey::new_unique(), asset)
            .unwrap()
            .config;
        let mut custody = Custody::new(Pubkey::new_unique());
        custody.credit_wallet(asset, 1_000).unwrap();

        assert!(LendingAdaptor
            .deposit(600, &config, &mut custody, Initiator::User)
            .is_err());
        assert_eq!(custody.wallet_balance(&asset), 1_000);
        assert_eq!(LendingAdaptor.balance_of(&config, &custody).unwrap(), 0);
    }
}
