use anchor_lang::prelude::*;

use crate::adaptors::{AdaptorId, Custody, PositionKey};
use crate::constants::*;
use crate::errors::FundError;
use crate::fees::FeeState;
use crate::ledger::{PositionLedger, TrustedCatalogue};

/// Per-fund state: roles, share supply, fees, positions and custody
///
/// Security considerations:
/// - Owner and strategist stored in state (not instruction args)
/// - Supply only changes together with an asset movement or a fee mint
/// - `locked` is set for the duration of every supply-changing operation
#[account]
pub struct FundState {
    /// Owner that configures fees and positions
    pub owner: Pubkey,

    /// Strategist allowed to rebalance and manage positions
    pub strategist: Pubkey,

    /// Registry holding protocol-wide settings and the trusted catalogue
    pub registry: Pubkey,

    /// Mint of the base asset the fund is denominated in
    pub asset_mint: Pubkey,

    /// Mint of the fund share token
    pub share_mint: Pubkey,

    /// Total shares, including fee shares not yet paid out
    pub total_supply: u64,

    /// Shares minted as fees and held for `payout_fees`
    pub fee_collector_shares: u64,

    /// Floor for the very first deposit
    pub min_initial_deposit: u64,

    /// Largest relative change in total assets one rebalance may cause (WAD)
    pub max_rebalance_deviation: u128,

    pub fees: FeeState,

    pub positions: PositionLedger,

    pub custody: Custody,

    /// Set while a supply-changing operation is in flight
    pub locked: bool,

    /// Bump seed for fund state PDA
    pub bump: u8,

    /// Bump seed for share mint PDA
    pub share_bump: u8,

    /// Bump seed for fund authority PDA
    pub authority_bump: u8,

    // Padding for future upgrades
    pub _reserved: [u8; 64],
}

impl FundState {
    /// 8 (discriminator) + 5 * 32 (keys) + 3 * 8 (amounts) + 16 (deviation)
    /// + fees + ledger + custody + 1 (locked) + 3 (bumps) + 64 (padding)
    pub const SPACE: usize = 8
        + 5 * 32
        + 3 * 8
        + 16
        + FeeState::SPACE
        + PositionLedger::SPACE
        + Custody::SPACE
        + 1
        + 3
        + 64;

    /// Fresh fund whose custody acts as `identity`
    pub fn new(
        identity: Pubkey,
        owner: Pubkey,
        strategist: Pubkey,
        registry: Pubkey,
        asset_mint: Pubkey,
        share_mint: Pubkey,
        min_initial_deposit: u64,
        fees: FeeState,
    ) -> Self {
        Self {
            owner,
            strategist,
            registry,
            asset_mint,
            share_mint,
            total_supply: 0,
            fee_collector_shares: 0,
            min_initial_deposit,
            max_rebalance_deviation: DEFAULT_REBALANCE_DEVIATION,
            fees,
            positions: PositionLedger::default(),
            custody: Custody::new(identity),
            locked: false,
            bump: 0,
            share_bump: 0,
            authority_bump: 0,
            _reserved: [0; 64],
        }
    }

    /// Shares held by depositors, i.e. everything but unpaid fee shares
    pub fn circulating_shares(&self) -> u64 {
        self.total_supply.saturating_sub(self.fee_collector_shares)
    }
}

/// Protocol registry: protocol-wide settings and the trusted position catalogue
///
/// Architecture: Registry + Whitelist
/// - Single registry consulted by every fund, passed in explicitly
/// - Registry owner adds/toggles trusted (adaptor, config) pairs
/// - Funds can only add and call positions found here
#[account]
pub struct ProtocolRegistry {
    /// Owner of protocol-wide settings
    pub authority: Pubkey,

    /// Receives the platform share of collected fees
    pub platform_payout: Pubkey,

    /// Positions funds may use
    pub trusted_positions: Vec<TrustedPosition>,

    /// Bump seed for PDA
    pub bump: u8,
}

/// Individual trusted position entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct TrustedPosition {
    pub position: PositionKey,

    /// Whether this position can currently be added or called
    pub enabled: bool,

    /// Human-readable name (e.g., "USDC lending")
    pub name: String,
}

impl ProtocolRegistry {
    /// 8 (discriminator) + 32 (authority) + 32 (payout) + 4 (vec len)
    /// + entries * (1 + 4 + config + 1 + 4 + name) + 1 (bump)
    pub const SPACE: usize = 8
        + 32
        + 32
        + 4
        + MAX_TRUSTED_POSITIONS * (1 + 4 + MAX_CONFIG_LEN + 1 + 4 + MAX_NAME_LEN)
        + 1;

    pub fn get_position_mut(&mut self, position: &PositionKey) -> Option<&mut TrustedPosition> {
        self.trusted_positions
            .iter_mut()
            .find(|p| p.position == *position)
    }

    /// Add a new enabled entry to the catalogue
    pub fn trust_position(&mut self, position: PositionKey, name: String) -> Result<()> {
        require!(name.len() <= MAX_NAME_LEN, FundError::NameTooLong);
        require!(
            position.config.len() <= MAX_CONFIG_LEN,
            FundError::ConfigTooLong
        );
        require!(
            !self.trusted_positions.iter().any(|p| p.position == position),
            FundError::PositionAlreadyUsed
        );
        require!(
            self.trusted_positions.len() < MAX_TRUSTED_POSITIONS,
            FundError::CatalogueFull
        );

        self.trusted_positions.push(TrustedPosition {
            position,
            enabled: true,
            name,
        });
        Ok(())
    }

    pub fn toggle_position(&mut self, position: &PositionKey, enabled: bool) -> Result<()> {
        let entry = self
            .get_position_mut(position)
            .ok_or(FundError::PositionNotTrusted)?;
        entry.enabled = enabled;
        Ok(())
    }

    /// Point the platform share of every fund's fees at `payout`
    pub fn set_platform_payout(&mut self, caller: Pubkey, payout: Pubkey) -> Result<()> {
        require_keys_eq!(caller, self.authority, FundError::NotRegistryOwner);
        require!(payout != Pubkey::default(), FundError::InvalidPlatformPayout);
        self.platform_payout = payout;
        Ok(())
    }
}

impl TrustedCatalogue for ProtocolRegistry {
    fn is_position_trusted(&self, adaptor: AdaptorId, config: &[u8]) -> bool {
        self.trusted_positions
            .iter()
            .any(|p| p.enabled && p.position.adaptor == adaptor && p.position.config == config)
    }
}

/// USD prices of every asset funds may hold, maintained by the registry owner
#[account]
pub struct PriceSheet {
    /// Registry whose authority may update prices
    pub registry: Pubkey,

    pub prices: Vec<AssetPrice>,

    /// Bump seed for PDA
    pub bump: u8,
}

/// Price entry for one asset
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetPrice {
    pub mint: Pubkey,
    pub decimals: u8,
    /// USD value of one whole token (10^decimals base units) in WAD
    pub usd_price: u128,
    pub updated_at: i64,
}

impl PriceSheet {
    /// 8 (discriminator) + 32 (registry) + 4 (vec len) + entries * 57 + 1 (bump)
    pub const SPACE: usize = 8 + 32 + 4 + MAX_PRICED_ASSETS * (32 + 1 + 16 + 8) + 1;

    /// Insert or replace the price of `mint`
    pub fn set_price(&mut self, price: AssetPrice) -> Result<()> {
        require!(price.usd_price > 0, FundError::UnsupportedAsset);
        if let Some(existing) = self.prices.iter_mut().find(|p| p.mint == price.mint) {
            *existing = price;
            return Ok(());
        }
        require!(
            self.prices.len() < MAX_PRICED_ASSETS,
            FundError::PriceSheetFull
        );
        self.prices.push(price);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_registry() -> ProtocolRegistry {
        ProtocolRegistry {
            authority: Pubkey::new_unique(),
            platform_payout: Pubkey::new_unique(),
            trusted_positions: Vec::new(),
            bump: 0,
        }
    }

    #[test]
    fn test_trusted_position_lookup() {
        let mut registry = mock_registry();
        let lending = PositionKey::market(
            AdaptorId::Lending,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        )
        .unwrap();
        registry
            .trust_position(lending.clone(), "Lending".to_string())
            .unwrap();

        assert!(registry.is_position_trusted(AdaptorId::Lending, &lending.config));
        // Same config under another adaptor is a different position
        assert!(!registry.is_position_trusted(AdaptorId::Staking, &lending.config));

        registry.toggle_position(&lending, false).unwrap();
        assert!(!registry.is_position_trusted(AdaptorId::Lending, &lending.config));
    }

    #[test]
    fn test_catalogue_rejects_duplicates_and_long_names() {
        let mut registry = mock_registry();
        let holding = PositionKey::holding(Pubkey::new_unique()).unwrap();

        registry
            .trust_position(holding.clone(), "Holding".to_string())
            .unwrap();
        assert!(registry
            .trust_position(holding.clone(), "Again".to_string())
            .is_err());
        assert!(registry
            .trust_position(
                PositionKey::holding(Pubkey::new_unique()).unwrap(),
                "x".repeat(33)
            )
            .is_err());
    }

    #[test]
    fn test_catalogue_capacity() {
        let mut registry = mock_registry();
        for _ in 0..MAX_TRUSTED_POSITIONS {
            registry
                .trust_position(
                    PositionKey::holding(Pubkey::new_unique()).unwrap(),
                    "Holding".to_string(),
                )
                .unwrap();
        }
        let result = registry.trust_position(
            PositionKey::holding(Pubkey::new_unique()).unwrap(),
            "Holding".to_string(),
        );
        assert!(result.is_err(), "Should fail once the catalogue is full");
    }

    #[test]
    fn test_platform_payout_is_registry_owner_only() {
        let mut registry = mock_registry();
        let authority = registry.authority;
        let payout = Pubkey::new_unique();

        assert!(registry
            .set_platform_payout(Pubkey::new_unique(), payout)
            .is_err());
        assert!(registry
            .set_platform_payout(authority, Pubkey::default())
            .is_err());

        registry.set_platform_payout(authority, payout).unwrap();
        assert_eq!(registry.platform_payout, payout);
    }

    #[test]
    fn test_toggle_unknown_position() {
        let mut registry = mock_registry();
        let unknown = PositionKey::holding(Pubkey::new_unique()).unwrap();
        assert!(registry.toggle_position(&unknown, true).is_err());
    }

    #[test]
    fn test_price_sheet_upsert() {
        let mint = Pubkey::new_unique();
        let mut sheet = PriceSheet {
            registry: Pubkey::new_unique(),
            prices: Vec::new(),
            bump: 0,
        };
        let mut price = AssetPrice {
            mint,
            decimals: 6,
            usd_price: WAD,
            updated_at: 0,
        };
        sheet.set_price(price).unwrap();
        price.usd_price = 2 * WAD;
        sheet.set_price(price).unwrap();

        assert_eq!(sheet.prices.len(), 1);
        assert_eq!(sheet.prices[0].usd_price, 2 * WAD);

        price.usd_price = 0;
        assert!(sheet.set_price(price).is_err());
    }
}
