use anchor_lang::prelude::*;

use crate::constants::WAD;
use crate::errors::FundError;
use crate::math::{mul_div, Rounding};

/// Bounds the net asset value a rebalance batch may move.
///
/// Opened with the value before the first call and closed with the value
/// after the last one; closing fails the batch when the relative change
/// exceeds the tolerance. Gains count the same as losses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebalanceGuard {
    pub assets_before: u64,
    /// Tolerance as a WAD fraction of `assets_before`
    pub max_deviation: u128,
}

impl RebalanceGuard {
    pub fn open(assets_before: u64, max_deviation: u128) -> Self {
        Self {
            assets_before,
            max_deviation,
        }
    }

    /// |after - before| / before in WAD; any movement away from zero is unbounded
    pub fn deviation(&self, assets_after: u64) -> Result<u128> {
        let moved = self.assets_before.abs_diff(assets_after) as u128;
        if moved == 0 {
            return Ok(0);
        }
        if self.assets_before == 0 {
            return Ok(u128::MAX);
        }
        mul_div(moved, WAD, self.assets_before as u128, Rounding::Up)
    }

    /// Deviation of the finished batch, or `RebalanceDeviationExceeded`
    pub fn close(self, assets_after: u64) -> Result<u128> {
        let deviation = self.deviation(assets_after)?;
        if deviation > self.max_deviation {
            msg!(
                "Rebalance rejected: assets {} -> {}, deviation {} above {}",
                self.assets_before,
                assets_after,
                deviation,
                self.max_deviation
            );
            return err!(FundError::RebalanceDeviationExceeded);
        }
        Ok(deviation)
    }
}
