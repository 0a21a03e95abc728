use anchor_lang::prelude::*;

use crate::errors::FundError;
use crate::math::{mul_div, to_u64, Rounding};
use crate::state::{AssetPrice, PriceSheet};

/// Source of asset prices for valuation.
///
/// Implementations only need `price_of`; conversions between assets go
/// through USD and always round down.
pub trait PriceOracle {
    /// USD price and decimals of `asset`, or `UnsupportedAsset`
    fn price_of(&self, asset: &Pubkey) -> Result<AssetPrice>;

    fn is_supported(&self, asset: &Pubkey) -> bool {
        self.price_of(asset).is_ok()
    }

    /// Value of `amount` units of `asset` expressed in units of `target`
    fn value_of(&self, asset: &Pubkey, amount: u64, target: &Pubkey) -> Result<u64> {
        if asset == target || amount == 0 {
            return Ok(amount);
        }
        let from = self.price_of(asset)?;
        let to = self.price_of(target)?;

        // amount * from_price * 10^to_decimals / (to_price * 10^from_decimals)
        let mut numerator = from.usd_price;
        let mut denominator = to.usd_price;
        if to.decimals >= from.decimals {
            numerator = numerator
                .checked_mul(pow10(to.decimals - from.decimals)?)
                .ok_or(FundError::MathOverflow)?;
        } else {
            denominator = denominator
                .checked_mul(pow10(from.decimals - to.decimals)?)
                .ok_or(FundError::MathOverflow)?;
        }
        to_u64(mul_div(amount as u128, numerator, denominator, Rounding::Down)?)
    }
}

fn pow10(exponent: u8) -> Result<u128> {
    10u128
        .checked_pow(exponent as u32)
        .ok_or(FundError::MathOverflow.into())
}

impl PriceOracle for PriceSheet {
    fn price_of(&self, asset: &Pubkey) -> Result<AssetPrice> {
        self.prices
            .iter()
            .find(|p| p.mint == *asset)
            .copied()
            .ok_or(FundError::UnsupportedAsset.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    fn sheet(prices: &[(Pubkey, u8, u128)]) -> PriceSheet {
        PriceSheet {
            registry: Pubkey::new_unique(),
            prices: prices
                .iter()
                .map(|(mint, decimals, usd_price)| AssetPrice {
                    mint: *mint,
                    decimals: *decimals,
                    usd_price: *usd_price,
                    updated_at: 0,
                })
                .collect(),
            bump: 0,
        }
    }

    #[test]
    fn test_same_asset_is_identity() {
        let usdc = Pubkey::new_unique();
        let oracle = sheet(&[]);
        // No price needed to value an asset in itself
        assert_eq!(oracle.value_of(&usdc, 1_234, &usdc).unwrap(), 1_234);
    }

    #[test]
    fn test_cross_decimal_conversion() {
        let usdc = Pubkey::new_unique();
        let wbtc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        let oracle = sheet(&[
            (usdc, 6, WAD),
            (wbtc, 8, 60_000 * WAD),
            (sol, 9, 150 * WAD),
        ]);

        // 0.5 BTC -> 30,000 USDC
        assert_eq!(
            oracle.value_of(&wbtc, 50_000_000, &usdc).unwrap(),
            30_000_000_000
        );
        // 300 USDC -> 2 SOL
        assert_eq!(
            oracle.value_of(&usdc, 300_000_000, &sol).unwrap(),
            2_000_000_000
        );
    }

    #[test]
    fn test_conversion_rounds_down() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let oracle = sheet(&[(a, 6, WAD), (b, 6, 3 * WAD)]);
        assert_eq!(oracle.value_of(&a, 10, &b).unwrap(), 3);
    }

    #[test]
    fn test_unsupported_asset() {
        let usdc = Pubkey::new_unique();
        let unknown = Pubkey::new_unique();
        let oracle = sheet(&[(usdc, 6, WAD)]);

        assert!(oracle.value_of(&unknown, 1, &usdc).is_err());
        assert!(!oracle.is_supported(&unknown));
        assert!(oracle.is_supported(&usdc));
    }
}
