use anchor_lang::prelude::*;

use crate::adaptors::{adaptor_for, Custody};
use crate::errors::FundError;
use crate::ledger::{PositionEntry, PositionLedger};
use crate::math::to_u64;
use crate::oracle::PriceOracle;

/// Net asset value of a fund, priced in its base asset.
///
/// Recomputed from live position balances on every call; nothing is cached,
/// because adaptor calls move balances within the same operation. Any
/// unpriceable position fails the whole valuation.
pub struct ValueAggregator<'a> {
    pub ledger: &'a PositionLedger,
    pub custody: &'a Custody,
    pub oracle: &'a dyn PriceOracle,
    pub base_asset: Pubkey,
}

/// What a depositor can take out of one credit position right now
pub struct WithdrawableAmount {
    pub asset: Pubkey,
    /// In units of `asset`
    pub amount: u64,
    /// `amount` priced in the base asset
    pub value: u64,
}

impl<'a> ValueAggregator<'a> {
    /// Balance of one position priced in the base asset
    pub fn position_value(&self, entry: &PositionEntry) -> Result<u64> {
        let adaptor = adaptor_for(entry.position.adaptor);
        let config = &entry.position.config;
        let balance = adaptor.balance_of(config, self.custody)?;
        let asset = adaptor.asset_of(config)?;
        self.oracle.value_of(&asset, balance, &self.base_asset)
    }

    /// Credit position values minus debt position values
    pub fn total_assets(&self) -> Result<u64> {
        let mut credit: u128 = 0;
        for entry in &self.ledger.credit {
            credit = credit
                .checked_add(self.position_value(entry)? as u128)
                .ok_or(FundError::MathOverflow)?;
        }
        let mut debt: u128 = 0;
        for entry in &self.ledger.debt {
            debt = debt
                .checked_add(self.position_value(entry)? as u128)
                .ok_or(FundError::MathOverflow)?;
        }
        to_u64(credit.checked_sub(debt).ok_or(FundError::NegativeNetAssets)?)
    }

    /// What a liquid credit position can pay out to a depositor
    pub fn withdrawable(&self, entry: &PositionEntry) -> Result<WithdrawableAmount> {
        let adaptor = adaptor_for(entry.position.adaptor);
        let config = &entry.position.config;
        let asset = adaptor.asset_of(config)?;
        if entry.is_debt || !entry.is_liquid {
            return Ok(WithdrawableAmount {
                asset,
                amount: 0,
                value: 0,
            });
        }
        let amount = adaptor
            .withdrawable_from(config, self.custody)?
            .min(adaptor.balance_of(config, self.custody)?);
        let value = self.oracle.value_of(&asset, amount, &self.base_asset)?;
        Ok(WithdrawableAmount {
            asset,
            amount,
            value,
        })
    }

    /// Sum of what depositors can redeem without strategist help; debt is
    /// never subtracted here
    pub fn total_assets_withdrawable(&self) -> Result<u64> {
        let mut total: u128 = 0;
        for entry in &self.ledger.credit {
            total = total
                .checked_add(self.withdrawable(entry)?.value as u128)
                .ok_or(FundError::MathOverflow)?;
        }
        to_u64(total)
    }
}
