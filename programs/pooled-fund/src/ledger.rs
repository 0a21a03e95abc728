use anchor_lang::prelude::*;

use crate::adaptors::{adaptor_for, AdaptorId, Custody, PositionKey};
use crate::constants::{MAX_CONFIG_LEN, MAX_POSITIONS};
use crate::errors::FundError;
use crate::oracle::PriceOracle;

/// Registry-side check that an (adaptor, config) pair may be used by funds
pub trait TrustedCatalogue {
    fn is_position_trusted(&self, adaptor: AdaptorId, config: &[u8]) -> bool;
}

/// One position the fund values and may call into
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PositionEntry {
    pub position: PositionKey,
    pub is_debt: bool,
    /// Illiquid positions are skipped when paying out depositors
    pub is_liquid: bool,
}

/// Ordered credit and debt positions of a fund.
///
/// Order is the withdrawal queue: depositors are paid from credit positions
/// front to back. It has no influence on valuation.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionLedger {
    pub credit: Vec<PositionEntry>,
    pub debt: Vec<PositionEntry>,
    /// Credit position receiving user deposits
    pub holding: Option<PositionKey>,
}

impl PositionLedger {
    /// Two lists of entries (1 + 4 + config + 2) + option tag + holding key
    pub const SPACE: usize = 2 * (4 + MAX_POSITIONS * (1 + 4 + MAX_CONFIG_LEN + 2))
        + 1
        + (1 + 4 + MAX_CONFIG_LEN);

    pub fn entry(&self, position: &PositionKey) -> Option<&PositionEntry> {
        self.credit
            .iter()
            .chain(self.debt.iter())
            .find(|e| e.position == *position)
    }

    pub fn contains(&self, position: &PositionKey) -> bool {
        self.entry(position).is_some()
    }

    pub fn holding_position(&self) -> Result<&PositionKey> {
        self.holding
            .as_ref()
            .ok_or(FundError::HoldingPositionNotSet.into())
    }

    fn list_mut(&mut self, in_debt: bool) -> &mut Vec<PositionEntry> {
        if in_debt {
            &mut self.debt
        } else {
            &mut self.credit
        }
    }

    /// Insert a trusted position at `index` of the credit or debt list
    pub fn add_position(
        &mut self,
        index: usize,
        position: PositionKey,
        is_debt: bool,
        is_liquid: bool,
        catalogue: &dyn TrustedCatalogue,
        oracle: &dyn PriceOracle,
    ) -> Result<()> {
        require!(
            catalogue.is_position_trusted(position.adaptor, &position.config),
            FundError::PositionNotTrusted
        );
        let adaptor = adaptor_for(position.adaptor);
        require!(adaptor.is_debt() == is_debt, FundError::DebtMismatch);
        let asset = adaptor.asset_of(&position.config)?;
        require!(oracle.is_supported(&asset), FundError::UnsupportedAsset);
        require!(!self.contains(&position), FundError::PositionAlreadyUsed);

        let list = self.list_mut(is_debt);
        require!(list.len() < MAX_POSITIONS, FundError::PositionsFull);
        require!(index <= list.len(), FundError::InvalidPositionIndex);
        list.insert(
            index,
            PositionEntry {
                position,
                is_debt,
                is_liquid,
            },
        );
        Ok(())
    }

    /// Remove an empty position; the holding position can never be removed
    pub fn remove_position(
        &mut self,
        index: usize,
        in_debt: bool,
        custody: &Custody,
    ) -> Result<PositionEntry> {
        let holding = self.holding.clone();
        let list = self.list_mut(in_debt);
        require!(index < list.len(), FundError::InvalidPositionIndex);

        let position = &list[index].position;
        require!(
            holding.as_ref() != Some(position),
            FundError::RemovingHoldingPosition
        );
        let balance = adaptor_for(position.adaptor).balance_of(&position.config, custody)?;
        require!(balance == 0, FundError::PositionNotEmpty);

        Ok(list.remove(index))
    }

    /// Swap two entries of the same list
    pub fn swap_positions(&mut self, first: usize, second: usize, in_debt: bool) -> Result<()> {
        let list = self.list_mut(in_debt);
        require!(
            first < list.len() && second < list.len(),
            FundError::InvalidPositionIndex
        );
        list.swap(first, second);
        Ok(())
    }

    /// Point user deposits at an existing credit position in the base asset
    pub fn set_holding_position(&mut self, position: PositionKey, base_asset: &Pubkey) -> Result<()> {
        require!(
            self.credit.iter().any(|e| e.position == position),
            FundError::PositionNotUsed
        );
        let asset = adaptor_for(position.adaptor).asset_of(&position.config)?;
        require!(asset == *base_asset, FundError::InvalidHoldingPosition);
        self.holding = Some(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;
    use crate::state::{AssetPrice, PriceSheet};

    struct TrustAll;

    impl TrustedCatalogue for TrustAll {
        fn is_position_trusted(&self, _adaptor: AdaptorId, _config: &[u8]) -> bool {
            true
        }
    }

    struct TrustNone;

    impl TrustedCatalogue for TrustNone {
        fn is_position_trusted(&self, _adaptor: AdaptorId, _config: &[u8]) -> bool {
            false
        }
    }

    fn oracle_for(assets: &[Pubkey]) -> PriceSheet {
        PriceSheet {
            registry: Pubkey::new_unique(),
            prices: assets
                .iter()
                .map(|mint| AssetPrice {
                    mint: *mint,
                    decimals: 6,
                    usd_price: WAD,
                    updated_at: 0,
                })
                .collect(),
            bump: 0,
        }
    }

    #[test]
    fn test_add_requires_trust_and_price() {
        let asset = Pubkey::new_unique();
        let holding = PositionKey::holding(asset).unwrap();
        let mut ledger = PositionLedger::default();

        assert!(ledger
            .add_position(0, holding.clone(), false, true, &TrustNone, &oracle_for(&[asset]))
            .is_err());
        assert!(ledger
            .add_position(0, holding.clone(), false, true, &TrustAll, &oracle_for(&[]))
            .is_err());
        ledger
            .add_position(0, holding.clone(), false, true, &TrustAll, &oracle_for(&[asset]))
            .unwrap();
        assert!(ledger.contains(&holding));
    }

    #[test]
    fn test_add_rejects_duplicates_and_debt_mismatch() {
        let asset = Pubkey::new_unique();
        let oracle = oracle_for(&[asset]);
        let debt = PositionKey::market(AdaptorId::Debt, Pubkey::new_unique(), asset).unwrap();
        let mut ledger = PositionLedger::default();

        // Debt adaptor cannot be listed as credit
        assert!(ledger
            .add_position(0, debt.clone(), false, false, &TrustAll, &oracle)
            .is_err());
        ledger
            .add_position(0, debt.clone(), true, false, &TrustAll, &oracle)
            .unwrap();
        assert!(ledger
            .add_position(0, debt, true, false, &TrustAll, &oracle)
            .is_err());
        assert_eq!(ledger.debt.len(), 1);
        assert!(ledger.credit.is_empty());
    }

    #[test]
    fn test_insert_order_and_swap() {
        let assets: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let oracle = oracle_for(&assets);
        let keys: Vec<PositionKey> = assets
            .iter()
            .map(|a| PositionKey::holding(*a).unwrap())
            .collect();
        let mut ledger = PositionLedger::default();

        ledger.add_position(0, keys[0].clone(), false, true, &TrustAll, &oracle).unwrap();
        ledger.add_position(0, keys[1].clone(), false, true, &TrustAll, &oracle).unwrap();
        ledger.add_position(1, keys[2].clone(), false, true, &TrustAll, &oracle).unwrap();
        let order: Vec<&PositionKey> = ledger.credit.iter().map(|e| &e.position).collect();
        assert_eq!(order, vec![&keys[1], &keys[2], &keys[0]]);

        ledger.swap_positions(0, 2, false).unwrap();
        assert_eq!(ledger.credit[0].position, keys[0]);
        assert!(ledger.swap_positions(0, 3, false).is_err());
        assert!(ledger
            .add_position(9, PositionKey::holding(assets[0]).unwrap(), false, true, &TrustAll, &oracle)
            .is_err());
    }

    #[test]
    fn test_remove_requires_empty_non_holding_position() {
        let fund = Pubkey::new_unique();
        let asset = Pubkey::new_unique();
        let oracle = oracle_for(&[asset]);
        let holding = PositionKey::holding(asset).unwrap();
        let lending = PositionKey::market(AdaptorId::Lending, Pubkey::new_unique(), asset).unwrap();
        let mut ledger = PositionLedger::default();
        ledger.add_position(0, holding.clone(), false, true, &TrustAll, &oracle).unwrap();
        ledger.add_position(1, lending.clone(), false, true, &TrustAll, &oracle).unwrap();
        ledger.set_holding_position(holding, &asset).unwrap();

        let mut custody = Custody::new(fund);
        custody.credit_book(&lending, 10).unwrap();

        assert!(ledger.remove_position(0, false, &custody).is_err());
        assert!(ledger.remove_position(1, false, &custody).is_err());

        custody.debit_book(&lending, 10).unwrap();
        let removed = ledger.remove_position(1, false, &custody).unwrap();
        assert_eq!(removed.position, lending);
        assert_eq!(ledger.credit.len(), 1);
    }

    #[test]
    fn test_holding_position_must_be_base_credit() {
        let base = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let oracle = oracle_for(&[base, other]);
        let other_holding = PositionKey::holding(other).unwrap();
        let mut ledger = PositionLedger::default();

        assert!(ledger.holding_position().is_err());
        assert!(ledger
            .set_holding_position(PositionKey::holding(base).unwrap(), &base)
            .is_err());

        ledger.add_position(0, other_holding.clone(), false, true, &TrustAll, &oracle).unwrap();
        assert!(ledger.set_holding_position(other_holding, &base).is_err());
    }
}
