use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::FundError;
use crate::math::{exp_wad, ln_wad, mul_div, to_u64, wad_div, wad_mul, Rounding};

/// Fee configuration and checkpoints of one fund
///
/// Ranges (checked at every setter):
/// - enter/exit fees: 0..=`MAX_ENTER_EXIT_FEE_BPS`
/// - management fee per year, performance fee: 0..=50% (WAD)
/// - strategist cut, reset threshold: 0..=100% (WAD)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeState {
    pub enter_fee_bps: u16,

    pub exit_fee_bps: u16,

    /// Yearly management fee as configured by the owner (WAD)
    pub management_fee_per_year: u128,

    /// Continuous per-second rate derived from `management_fee_per_year` (WAD)
    pub management_rate: u128,

    pub last_management_claim: i64,

    /// Share of gains above the high-water mark taken as fee (WAD)
    pub performance_fee: u128,

    /// Highest settled share price, assets per share (WAD); 0 until the first join
    pub high_water_mark: u128,

    pub high_water_mark_reset_time: i64,

    /// Total assets when the high-water mark was last reset or initialised
    pub high_water_mark_reset_assets: u64,

    /// Relative asset movement that allows a reset before the cooldown (WAD);
    /// 0 disables the movement condition
    pub high_water_mark_reset_threshold: u128,

    /// Strategist share of paid out fee shares (WAD)
    pub strategist_cut: u128,

    pub strategist_payout: Option<Pubkey>,
}

/// Fee shares owed as of one point in time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSettlement {
    pub management_shares: u64,
    pub performance_shares: u64,
    /// High-water mark after this settlement
    pub high_water_mark: u128,
}

impl FeeSettlement {
    pub fn total_shares(&self) -> Result<u64> {
        self.management_shares
            .checked_add(self.performance_shares)
            .ok_or(FundError::MathOverflow.into())
    }
}

/// Per-second continuous rate `a` such that e^(a * year) = 1 / (1 - yearly_fee)
pub fn management_rate_for(yearly_fee: u128) -> Result<u128> {
    if yearly_fee == 0 {
        return Ok(0);
    }
    require!(yearly_fee < WAD, FundError::InvalidFeeRate);
    let remaining = (WAD - yearly_fee) as i128;
    let log = ln_wad(remaining)?;
    let per_year = log.checked_neg().ok_or(FundError::MathOverflow)?;
    Ok(per_year.max(0) as u128 / SECONDS_PER_YEAR as u128)
}

impl FeeState {
    /// 2 + 2 (bps) + 16 + 16 + 8 (management) + 16 + 16 (performance)
    /// + 8 + 8 + 16 (reset) + 16 (cut) + 33 (payout)
    pub const SPACE: usize = 2 + 2 + 16 + 16 + 8 + 16 + 16 + 8 + 8 + 16 + 16 + 33;

    /// Fee-free state with every checkpoint at `now`
    pub fn new(now: i64) -> Self {
        Self {
            last_management_claim: now,
            high_water_mark_reset_time: now,
            ..Self::default()
        }
    }

    pub fn set_enter_fees(&mut self, bps: u16) -> Result<()> {
        require!(bps <= MAX_ENTER_EXIT_FEE_BPS, FundError::InvalidFeeRate);
        self.enter_fee_bps = bps;
        Ok(())
    }

    pub fn set_exit_fees(&mut self, bps: u16) -> Result<()> {
        require!(bps <= MAX_ENTER_EXIT_FEE_BPS, FundError::InvalidFeeRate);
        self.exit_fee_bps = bps;
        Ok(())
    }

    /// Callers settle pending fees first so the old rate covers elapsed time
    pub fn set_management_fees_per_year(&mut self, yearly_fee: u128) -> Result<()> {
        require!(
            yearly_fee <= MAX_MANAGEMENT_FEE_PER_YEAR,
            FundError::InvalidFeeRate
        );
        self.management_rate = management_rate_for(yearly_fee)?;
        self.management_fee_per_year = yearly_fee;
        Ok(())
    }

    /// Callers settle pending fees first so gains so far use the old rate
    pub fn set_performance_fees(&mut self, fee: u128) -> Result<()> {
        require!(fee <= MAX_PERFORMANCE_FEE, FundError::InvalidFeeRate);
        self.performance_fee = fee;
        Ok(())
    }

    pub fn set_strategist_cut(&mut self, cut: u128) -> Result<()> {
        require!(cut <= MAX_STRATEGIST_CUT, FundError::InvalidFeeCut);
        self.strategist_cut = cut;
        Ok(())
    }

    pub fn set_strategist_payout(&mut self, payout: Pubkey) {
        self.strategist_payout = Some(payout);
    }

    pub fn set_high_water_mark_reset_threshold(&mut self, threshold: u128) -> Result<()> {
        require!(threshold <= WAD, FundError::InvalidResetThreshold);
        self.high_water_mark_reset_threshold = threshold;
        Ok(())
    }

    /// Management fee shares for the time since the last claim:
    /// supply * (e^(rate * elapsed) - 1)
    fn management_shares(&self, total_supply: u64, now: i64) -> Result<u64> {
        let elapsed = now.saturating_sub(self.last_management_claim);
        if total_supply == 0 || self.management_rate == 0 || elapsed <= 0 {
            return Ok(0);
        }
        let exponent = self
            .management_rate
            .checked_mul(elapsed as u128)
            .ok_or(FundError::ExponentOutOfRange)?;
        let exponent = i128::try_from(exponent).map_err(|_| FundError::ExponentOutOfRange)?;
        let growth = exp_wad(exponent)?
            .checked_sub(WAD as i128)
            .ok_or(FundError::MathOverflow)?;
        to_u64(wad_mul(total_supply as u128, growth.max(0) as u128)?)
    }

    /// Performance fee shares and the resulting high-water mark, priced
    /// against `supply` (which already includes fresh management shares)
    fn performance(&self, total_assets: u64, supply: u128) -> Result<(u64, u128)> {
        if supply == 0 {
            return Ok((0, self.high_water_mark));
        }
        let assets = total_assets as u128;
        let price = wad_div(assets, supply)?;

        if self.high_water_mark == 0 {
            return Ok((0, price));
        }
        if self.performance_fee == 0 {
            return Ok((0, self.high_water_mark.max(price)));
        }

        let high_water_assets = mul_div(supply, self.high_water_mark, WAD, Rounding::Up)?;
        if assets <= high_water_assets {
            return Ok((0, self.high_water_mark));
        }

        let gain = assets - high_water_assets;
        let ownership = mul_div(gain, self.performance_fee, assets, Rounding::Down)?;
        let shares = mul_div(supply, ownership, WAD - ownership, Rounding::Down)?;
        Ok((to_u64(shares)?, price))
    }

    /// Fees owed at `now` without touching any checkpoint
    pub fn pending(&self, total_assets: u64, total_supply: u64, now: i64) -> Result<FeeSettlement> {
        let management_shares = self.management_shares(total_supply, now)?;
        let supply = (total_supply as u128)
            .checked_add(management_shares as u128)
            .ok_or(FundError::MathOverflow)?;
        let (performance_shares, high_water_mark) = self.performance(total_assets, supply)?;
        Ok(FeeSettlement {
            management_shares,
            performance_shares,
            high_water_mark,
        })
    }

    /// Settle fees at `now`: advances the management checkpoint and the
    /// high-water mark. The caller mints the returned shares.
    pub fn accrue(&mut self, total_assets: u64, total_supply: u64, now: i64) -> Result<FeeSettlement> {
        let settlement = self.pending(total_assets, total_supply, now)?;
        self.last_management_claim = now;
        self.high_water_mark = settlement.high_water_mark;
        Ok(settlement)
    }

    /// First join: start the high-water mark at the entry price
    pub fn checkpoint_high_water_mark(&mut self, total_assets: u64, total_supply: u64) -> Result<()> {
        if self.high_water_mark != 0 || total_supply == 0 {
            return Ok(());
        }
        self.high_water_mark = wad_div(total_assets as u128, total_supply as u128)?;
        self.high_water_mark_reset_assets = total_assets;
        Ok(())
    }

    /// Signed relative asset movement since the last reset (WAD)
    pub fn performance_since_reset(&self, total_assets: u64) -> Result<i128> {
        if self.high_water_mark_reset_assets == 0 {
            return Ok(0);
        }
        let now_assets = total_assets as i128;
        let then_assets = self.high_water_mark_reset_assets as i128;
        (now_assets - then_assets)
            .checked_mul(WAD as i128)
            .map(|scaled| scaled / then_assets)
            .ok_or(FundError::MathOverflow.into())
    }

    /// Whether a reset is allowed: cooldown elapsed, or assets moved past the threshold
    pub fn can_reset_high_water_mark(&self, total_assets: u64, now: i64) -> Result<bool> {
        let elapsed = now.saturating_sub(self.high_water_mark_reset_time);
        if elapsed >= HIGH_WATER_MARK_RESET_INTERVAL {
            return Ok(true);
        }
        if self.high_water_mark_reset_threshold == 0 || self.high_water_mark_reset_assets == 0 {
            return Ok(false);
        }
        let movement = self.performance_since_reset(total_assets)?.unsigned_abs();
        Ok(movement >= self.high_water_mark_reset_threshold)
    }

    /// High-water mark after a reset:
    /// `old * (1 + perf - perf * performance_fee)`, never below zero
    pub fn reset_high_water_mark_price(&self, old_high_water_mark: u128, performance: i128) -> Result<u128> {
        let magnitude = performance.unsigned_abs();
        let fee_part = wad_mul(magnitude, self.performance_fee)?;
        let factor = if performance >= 0 {
            WAD.checked_add(magnitude)
                .and_then(|f| f.checked_sub(fee_part))
                .ok_or(FundError::MathOverflow)?
        } else {
            match WAD
                .checked_add(fee_part)
                .and_then(|f| f.checked_sub(magnitude))
            {
                Some(factor) => factor,
                None => return Ok(0),
            }
        };
        wad_mul(old_high_water_mark, factor)
    }

    /// Move the reset checkpoints to `now`
    pub fn mark_reset(&mut self, high_water_mark: u128, total_assets: u64, now: i64) {
        self.high_water_mark = high_water_mark;
        self.high_water_mark_reset_time = now;
        self.high_water_mark_reset_assets = total_assets;
    }
}
