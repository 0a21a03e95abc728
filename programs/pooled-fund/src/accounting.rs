use anchor_lang::prelude::*;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::FundError;
use crate::math::{mul_div, to_u64, Rounding};

/// Assets and shares of a fund at one instant, after pending fees.
///
/// Never persisted. Rounding in every conversion favors the fund:
/// - deposit: shares received round down
/// - mint: assets paid round up
/// - withdraw: shares burned round up
/// - redeem: assets received round down
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetAssetSnapshot {
    pub total_assets: u64,
    pub total_supply: u64,
}

/// `amount` minus a `bps` fee
fn less_fee(amount: u64, bps: u16, rounding: Rounding) -> Result<u64> {
    let kept = BPS_DENOMINATOR - bps as u128;
    to_u64(mul_div(amount as u128, kept, BPS_DENOMINATOR, rounding)?)
}

/// Gross amount whose `bps` fee leaves `amount`
fn plus_fee(amount: u64, bps: u16, rounding: Rounding) -> Result<u64> {
    let kept = BPS_DENOMINATOR - bps as u128;
    to_u64(mul_div(amount as u128, BPS_DENOMINATOR, kept, rounding)?)
}

impl NetAssetSnapshot {
    pub fn new(total_assets: u64, total_supply: u64) -> Self {
        Self {
            total_assets,
            total_supply,
        }
    }

    /// Snapshot with `fee_shares` freshly minted
    pub fn with_fee_shares(self, fee_shares: u64) -> Result<Self> {
        Ok(Self {
            total_assets: self.total_assets,
            total_supply: self
                .total_supply
                .checked_add(fee_shares)
                .ok_or(FundError::MathOverflow)?,
        })
    }

    pub fn convert_to_shares(&self, assets: u64, rounding: Rounding) -> Result<u64> {
        if self.total_supply == 0 {
            return Ok(assets);
        }
        require!(self.total_assets > 0, FundError::DivisionByZero);
        to_u64(mul_div(
            assets as u128,
            self.total_supply as u128,
            self.total_assets as u128,
            rounding,
        )?)
    }

    pub fn convert_to_assets(&self, shares: u64, rounding: Rounding) -> Result<u64> {
        if self.total_supply == 0 {
            return Ok(shares);
        }
        to_u64(mul_div(
            shares as u128,
            self.total_assets as u128,
            self.total_supply as u128,
            rounding,
        )?)
    }

    /// Shares minted for `assets`, after the enter fee
    pub fn shares_for_deposit(&self, assets: u64, enter_fee_bps: u16) -> Result<u64> {
        let net = less_fee(assets, enter_fee_bps, Rounding::Down)?;
        self.convert_to_shares(net, Rounding::Down)
    }

    /// Assets, enter fee included, the caller pays for `shares`
    pub fn assets_for_mint(&self, shares: u64, enter_fee_bps: u16) -> Result<u64> {
        let net = self.convert_to_assets(shares, Rounding::Up)?;
        plus_fee(net, enter_fee_bps, Rounding::Up)
    }

    /// Shares burned to pay out `assets` after the exit fee
    pub fn shares_for_withdraw(&self, assets: u64, exit_fee_bps: u16) -> Result<u64> {
        let gross = plus_fee(assets, exit_fee_bps, Rounding::Up)?;
        self.convert_to_shares(gross, Rounding::Up)
    }

    /// Assets paid out for `shares`, after the exit fee
    pub fn assets_for_redeem(&self, shares: u64, exit_fee_bps: u16) -> Result<u64> {
        let gross = self.convert_to_assets(shares, Rounding::Down)?;
        less_fee(gross, exit_fee_bps, Rounding::Down)
    }

    /// Largest share amount whose redemption pays at most `assets`
    pub fn shares_redeemable_for(&self, assets: u64, exit_fee_bps: u16) -> Result<u64> {
        let gross = plus_fee(assets, exit_fee_bps, Rounding::Down)?;
        self.convert_to_shares(gross, Rounding::Down)
    }
}
