use anchor_lang::prelude::*;

use crate::accounting::NetAssetSnapshot;
use crate::adaptors::{adaptor_for, AdaptorId, Initiator, OutboundTransfer, PositionKey};
use crate::constants::*;
use crate::errors::FundError;
use crate::fees::FeeSettlement;
use crate::guard::RebalanceGuard;
use crate::ledger::{PositionEntry, TrustedCatalogue};
use crate::math::{to_u64, wad_mul};
use crate::oracle::PriceOracle;
use crate::state::{FundState, ProtocolRegistry};
use crate::valuation::ValueAggregator;

/// What one rebalance call asks its adaptor to do
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum AdaptorAction {
    Deposit { amount: u64 },
    Withdraw { amount: u64, receiver: Pubkey },
}

/// One call of a rebalance batch, addressed to an (adaptor, config) position
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AdaptorCall {
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
    pub action: AdaptorAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinReceipt {
    pub assets: u64,
    pub shares: u64,
    /// Fees settled before the join
    pub fees: FeeSettlement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitReceipt {
    pub assets: u64,
    pub shares: u64,
    /// Tokens the caller has to send out of the fund, possibly in several assets
    pub payouts: Vec<OutboundTransfer>,
    pub fees: FeeSettlement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebalanceReceipt {
    pub assets_before: u64,
    pub assets_after: u64,
    pub deviation: u128,
    pub payouts: Vec<OutboundTransfer>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighWaterMarkResetReceipt {
    pub previous: u128,
    pub high_water_mark: u128,
    /// Relative asset movement since the last reset (WAD)
    pub performance: i128,
    pub fees: FeeSettlement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeePayout {
    pub strategist: Option<Pubkey>,
    pub strategist_shares: u64,
    pub platform: Pubkey,
    pub platform_shares: u64,
    pub fees: FeeSettlement,
}

/// Pooled fund: composes valuation, fees, share accounting and the
/// rebalance guard over one `FundState`.
///
/// Security considerations:
/// - Every supply-changing operation settles fees first, in the same call
/// - Every mutating operation runs through `atomically`: a failure restores
///   the state as it was (on chain the runtime discards it), and nested
///   entry fails with `Reentrancy`
/// - Adaptor calls are only made for positions that are both in the ledger
///   and trusted by the registry
/// - The registry and oracle are passed in, never looked up globally
pub struct Fund<'a> {
    state: &'a mut FundState,
    registry: &'a ProtocolRegistry,
    oracle: &'a dyn PriceOracle,
    now: i64,
}

impl<'a> Fund<'a> {
    pub fn new(
        state: &'a mut FundState,
        registry: &'a ProtocolRegistry,
        oracle: &'a dyn PriceOracle,
        now: i64,
    ) -> Self {
        Self {
            state,
            registry,
            oracle,
            now,
        }
    }

    pub fn state(&self) -> &FundState {
        self.state
    }

    fn aggregator(&self) -> ValueAggregator<'_> {
        ValueAggregator {
            ledger: &self.state.positions,
            custody: &self.state.custody,
            oracle: self.oracle,
            base_asset: self.state.asset_mint,
        }
    }

    fn require_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.state.owner, FundError::NotFundOwner);
        Ok(())
    }

    fn require_strategist(&self, caller: &Pubkey) -> Result<()> {
        require!(
            *caller == self.state.strategist || *caller == self.state.owner,
            FundError::NotStrategist
        );
        Ok(())
    }

    fn require_registry_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.registry.authority, FundError::NotRegistryOwner);
        Ok(())
    }

    /// Run `operation` holding the fund lock; on error the state is restored
    fn atomically<T>(&mut self, operation: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        require!(!self.state.locked, FundError::Reentrancy);
        let before = self.snapshot();
        self.state.locked = true;

        match operation(self) {
            Ok(value) => {
                self.state.locked = false;
                Ok(value)
            }
            Err(error) => {
                match before {
                    Some(state) => *self.state = state,
                    None => self.state.locked = false,
                }
                Err(error)
            }
        }
    }

    /// The runtime drops every account write of a failed transaction, so
    /// only off-chain callers need a copy to restore from
    #[cfg(not(target_os = "solana"))]
    fn snapshot(&self) -> Option<FundState> {
        Some(self.state.clone())
    }

    #[cfg(target_os = "solana")]
    fn snapshot(&self) -> Option<FundState> {
        None
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    pub fn total_assets(&self) -> Result<u64> {
        self.aggregator().total_assets()
    }

    pub fn total_assets_withdrawable(&self) -> Result<u64> {
        self.aggregator().total_assets_withdrawable()
    }

    /// Fee shares that would be minted by settling now
    pub fn pending_fees(&self) -> Result<FeeSettlement> {
        self.state
            .fees
            .pending(self.total_assets()?, self.state.total_supply, self.now)
    }

    /// Assets and supply as the next supply-changing operation will see them
    pub fn preview_snapshot(&self) -> Result<NetAssetSnapshot> {
        let total_assets = self.total_assets()?;
        let pending = self
            .state
            .fees
            .pending(total_assets, self.state.total_supply, self.now)?;
        NetAssetSnapshot::new(total_assets, self.state.total_supply)
            .with_fee_shares(pending.total_shares()?)
    }

    pub fn preview_deposit(&self, assets: u64) -> Result<u64> {
        require!(assets > 0, FundError::ZeroAmount);
        self.preview_snapshot()?
            .shares_for_deposit(assets, self.state.fees.enter_fee_bps)
    }

    pub fn preview_mint(&self, shares: u64) -> Result<u64> {
        require!(shares > 0, FundError::ZeroShares);
        self.preview_snapshot()?
            .assets_for_mint(shares, self.state.fees.enter_fee_bps)
    }

    pub fn preview_withdraw(&self, assets: u64) -> Result<u64> {
        require!(assets > 0, FundError::ZeroAmount);
        self.preview_snapshot()?
            .shares_for_withdraw(assets, self.state.fees.exit_fee_bps)
    }

    pub fn preview_redeem(&self, shares: u64) -> Result<u64> {
        require!(shares > 0, FundError::ZeroShares);
        self.preview_snapshot()?
            .assets_for_redeem(shares, self.state.fees.exit_fee_bps)
    }

    /// Assets a holder of `owner_shares` can withdraw right now
    pub fn max_withdraw(&self, owner_shares: u64) -> Result<u64> {
        if owner_shares == 0 {
            return Ok(0);
        }
        let owned = self
            .preview_snapshot()?
            .assets_for_redeem(owner_shares, self.state.fees.exit_fee_bps)?;
        Ok(owned.min(self.total_assets_withdrawable()?))
    }

    /// Shares a holder of `owner_shares` can redeem right now
    pub fn max_redeem(&self, owner_shares: u64) -> Result<u64> {
        if owner_shares == 0 {
            return Ok(0);
        }
        let liquid = self
            .preview_snapshot()?
            .shares_redeemable_for(self.total_assets_withdrawable()?, self.state.fees.exit_fee_bps)?;
        Ok(owner_shares.min(liquid))
    }

    // ---------------------------------------------------------------------
    // Joins and exits
    // ---------------------------------------------------------------------

    /// Mint pending fee shares to the fee collector and return the snapshot
    /// the following conversion has to use
    fn settle_fees(&mut self) -> Result<(FeeSettlement, NetAssetSnapshot)> {
        let total_assets = self.total_assets()?;
        let supply = self.state.total_supply;
        let settlement = self.state.fees.accrue(total_assets, supply, self.now)?;

        let minted = settlement.total_shares()?;
        if minted > 0 {
            self.state.total_supply = supply.checked_add(minted).ok_or(FundError::MathOverflow)?;
            self.state.fee_collector_shares = self
                .state
                .fee_collector_shares
                .checked_add(minted)
                .ok_or(FundError::MathOverflow)?;
            msg!(
                "Fees accrued: {} management + {} performance shares",
                settlement.management_shares,
                settlement.performance_shares
            );
        }
        Ok((
            settlement,
            NetAssetSnapshot::new(total_assets, self.state.total_supply),
        ))
    }

    fn check_initial_deposit(&self, snapshot: &NetAssetSnapshot, assets: u64) -> Result<()> {
        if snapshot.total_supply == 0 {
            require!(
                assets >= self.state.min_initial_deposit,
                FundError::InitialDepositTooSmall
            );
        }
        Ok(())
    }

    /// Credit `assets` to the holding position and mint `shares`
    fn enter(&mut self, assets: u64, shares: u64) -> Result<()> {
        let holding = self.state.positions.holding_position()?.clone();
        adaptor_for(holding.adaptor).deposit(
            assets,
            &holding.config,
            &mut self.state.custody,
            Initiator::User,
        )?;

        self.state.total_supply = self
            .state
            .total_supply
            .checked_add(shares)
            .ok_or(FundError::MathOverflow)?;

        let total_assets = self.total_assets()?;
        let total_supply = self.state.total_supply;
        self.state
            .fees
            .checkpoint_high_water_mark(total_assets, total_supply)
    }

    /// Burn `shares` and pay `assets` worth of value out to `receiver`
    fn exit(
        &mut self,
        assets: u64,
        shares: u64,
        receiver: Pubkey,
        owner_shares: u64,
    ) -> Result<Vec<OutboundTransfer>> {
        require!(shares <= owner_shares, FundError::InsufficientShares);
        require!(
            receiver != self.state.custody.owner,
            FundError::InvalidPayoutAccount
        );
        require!(
            assets <= self.total_assets_withdrawable()?,
            FundError::InsufficientLiquidity
        );

        self.state.total_supply = self
            .state
            .total_supply
            .checked_sub(shares)
            .ok_or(FundError::InsufficientShares)?;
        self.pay_out(assets, receiver)?;
        Ok(self.state.custody.take_outbound())
    }

    /// Pull `assets` (in base-asset value) from liquid credit positions in
    /// ledger order. Positions in other assets pay out in kind.
    fn pay_out(&mut self, assets: u64, receiver: Pubkey) -> Result<()> {
        let queue: Vec<PositionEntry> = self.state.positions.credit.clone();
        let base_asset = self.state.asset_mint;
        let mut remaining = assets;

        for entry in &queue {
            if remaining == 0 {
                break;
            }
            let available = self.aggregator().withdrawable(entry)?;
            if available.value == 0 {
                continue;
            }

            let amount = if available.value <= remaining {
                remaining -= available.value;
                available.amount
            } else {
                let partial = self
                    .oracle
                    .value_of(&base_asset, remaining, &available.asset)?
                    .min(available.amount);
                remaining = 0;
                partial
            };

            adaptor_for(entry.position.adaptor).withdraw(
                amount,
                receiver,
                &entry.position.config,
                &mut self.state.custody,
                Initiator::User,
            )?;
        }

        require!(remaining == 0, FundError::InsufficientLiquidity);
        Ok(())
    }

    /// Deposit `assets` and mint shares
    pub fn deposit(&mut self, assets: u64) -> Result<JoinReceipt> {
        self.atomically(|fund| {
            require!(assets > 0, FundError::ZeroAmount);
            let (fees, snapshot) = fund.settle_fees()?;
            fund.check_initial_deposit(&snapshot, assets)?;

            let shares = snapshot.shares_for_deposit(assets, fund.state.fees.enter_fee_bps)?;
            require!(shares > 0, FundError::ZeroShares);

            fund.enter(assets, shares)?;
            Ok(JoinReceipt {
                assets,
                shares,
                fees,
            })
        })
    }

    /// Mint exactly `shares`, charging the assets they cost
    pub fn mint(&mut self, shares: u64) -> Result<JoinReceipt> {
        self.atomically(|fund| {
            require!(shares > 0, FundError::ZeroShares);
            let (fees, snapshot) = fund.settle_fees()?;

            let assets = snapshot.assets_for_mint(shares, fund.state.fees.enter_fee_bps)?;
            require!(assets > 0, FundError::ZeroAmount);
            fund.check_initial_deposit(&snapshot, assets)?;

            fund.enter(assets, shares)?;
            Ok(JoinReceipt {
                assets,
                shares,
                fees,
            })
        })
    }

    /// Pay out exactly `assets`, burning the shares they cost
    pub fn withdraw(
        &mut self,
        assets: u64,
        receiver: Pubkey,
        owner_shares: u64,
    ) -> Result<ExitReceipt> {
        self.atomically(|fund| {
            require!(assets > 0, FundError::ZeroAmount);
            let (fees, snapshot) = fund.settle_fees()?;

            let shares = snapshot.shares_for_withdraw(assets, fund.state.fees.exit_fee_bps)?;
            require!(shares > 0, FundError::ZeroShares);

            let payouts = fund.exit(assets, shares, receiver, owner_shares)?;
            Ok(ExitReceipt {
                assets,
                shares,
                payouts,
                fees,
            })
        })
    }

    /// Burn `shares` and pay out what they are worth
    pub fn redeem(
        &mut self,
        shares: u64,
        receiver: Pubkey,
        owner_shares: u64,
    ) -> Result<ExitReceipt> {
        self.atomically(|fund| {
            require!(shares > 0, FundError::ZeroShares);
            let (fees, snapshot) = fund.settle_fees()?;

            let assets = snapshot.assets_for_redeem(shares, fund.state.fees.exit_fee_bps)?;
            require!(assets > 0, FundError::ZeroAmount);

            let payouts = fund.exit(assets, shares, receiver, owner_shares)?;
            Ok(ExitReceipt {
                assets,
                shares,
                payouts,
                fees,
            })
        })
    }

    // ---------------------------------------------------------------------
    // Rebalance
    // ---------------------------------------------------------------------

    fn execute(&mut self, call: &AdaptorCall) -> Result<()> {
        require!(
            self.registry
                .is_position_trusted(call.adaptor, &call.config),
            FundError::PositionNotTrusted
        );
        let position = PositionKey::new(call.adaptor, call.config.clone());
        require!(
            self.state.positions.contains(&position),
            FundError::PositionNotUsed
        );

        let adaptor = adaptor_for(call.adaptor);
        match call.action {
            AdaptorAction::Deposit { amount } => adaptor.deposit(
                amount,
                &call.config,
                &mut self.state.custody,
                Initiator::Strategist,
            ),
            AdaptorAction::Withdraw { amount, receiver } => adaptor.withdraw(
                amount,
                receiver,
                &call.config,
                &mut self.state.custody,
                Initiator::Strategist,
            ),
        }
    }

    /// Run a batch of strategist calls; the whole batch fails if any call
    /// fails or total assets move beyond the deviation tolerance
    pub fn rebalance(&mut self, caller: Pubkey, calls: &[AdaptorCall]) -> Result<RebalanceReceipt> {
        self.require_strategist(&caller)?;
        require!(calls.len() <= MAX_REBALANCE_CALLS, FundError::TooManyCalls);

        self.atomically(|fund| {
            let guard = RebalanceGuard::open(fund.total_assets()?, fund.state.max_rebalance_deviation);
            for call in calls {
                fund.execute(call)?;
            }
            let assets_after = fund.total_assets()?;
            let deviation = guard.close(assets_after)?;

            Ok(RebalanceReceipt {
                assets_before: guard.assets_before,
                assets_after,
                deviation,
                payouts: fund.state.custody.take_outbound(),
            })
        })
    }

    // ---------------------------------------------------------------------
    // Position management (strategist or owner)
    // ---------------------------------------------------------------------

    pub fn add_position(
        &mut self,
        caller: Pubkey,
        index: u32,
        position: PositionKey,
        is_debt: bool,
        is_liquid: bool,
    ) -> Result<()> {
        self.require_strategist(&caller)?;
        self.state.positions.add_position(
            index as usize,
            position,
            is_debt,
            is_liquid,
            self.registry,
            self.oracle,
        )
    }

    pub fn remove_position(&mut self, caller: Pubkey, index: u32, in_debt: bool) -> Result<PositionEntry> {
        self.require_strategist(&caller)?;
        self.state
            .positions
            .remove_position(index as usize, in_debt, &self.state.custody)
    }

    pub fn swap_positions(&mut self, caller: Pubkey, first: u32, second: u32, in_debt: bool) -> Result<()> {
        self.require_strategist(&caller)?;
        self.state
            .positions
            .swap_positions(first as usize, second as usize, in_debt)
    }

    pub fn set_holding_position(&mut self, caller: Pubkey, position: PositionKey) -> Result<()> {
        self.require_strategist(&caller)?;
        let base_asset = self.state.asset_mint;
        self.state
            .positions
            .set_holding_position(position, &base_asset)
    }

    // ---------------------------------------------------------------------
    // Position balances
    // ---------------------------------------------------------------------

    /// Replace the wallet balance of every holding position with what the
    /// fund's token account for that asset holds. `observed` fails when the
    /// account was not supplied.
    pub fn observe_holdings(&mut self, mut observed: impl FnMut(&Pubkey) -> Result<u64>) -> Result<()> {
        require!(!self.state.locked, FundError::Reentrancy);
        let holding = adaptor_for(AdaptorId::Holding);
        let assets = self
            .state
            .positions
            .credit
            .iter()
            .filter(|entry| entry.position.adaptor == AdaptorId::Holding)
            .map(|entry| holding.asset_of(&entry.position.config))
            .collect::<Result<Vec<_>>>()?;

        for asset in assets {
            let amount = observed(&asset)?;
            self.state.custody.observe_token_account(asset, amount)?;
        }
        Ok(())
    }

    /// Registry owner relays what a lending, debt or staking market holds
    /// for this fund, and how much of it is locked
    pub fn report_position(
        &mut self,
        caller: Pubkey,
        position: PositionKey,
        balance: u64,
        locked: u64,
    ) -> Result<()> {
        self.require_registry_owner(&caller)?;
        require!(
            position.adaptor != AdaptorId::Holding,
            FundError::HoldingBalanceObserved
        );
        require!(locked <= balance, FundError::LockedExceedsBalance);
        require!(
            self.state.positions.contains(&position),
            FundError::PositionNotUsed
        );
        self.atomically(|fund| {
            fund.state.custody.report_book(&position, balance, locked)?;
            msg!("Position reported: balance {} locked {}", balance, locked);
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Fee configuration
    // ---------------------------------------------------------------------

    pub fn set_management_fees_per_year(&mut self, caller: Pubkey, yearly_fee: u128) -> Result<FeeSettlement> {
        self.require_owner(&caller)?;
        self.atomically(|fund| {
            let (settlement, _) = fund.settle_fees()?;
            fund.state.fees.set_management_fees_per_year(yearly_fee)?;
            Ok(settlement)
        })
    }

    pub fn set_performance_fees(&mut self, caller: Pubkey, fee: u128) -> Result<FeeSettlement> {
        self.require_owner(&caller)?;
        self.atomically(|fund| {
            let (settlement, _) = fund.settle_fees()?;
            fund.state.fees.set_performance_fees(fee)?;
            Ok(settlement)
        })
    }

    pub fn set_enter_fees(&mut self, caller: Pubkey, bps: u16) -> Result<()> {
        self.require_owner(&caller)?;
        self.state.fees.set_enter_fees(bps)
    }

    pub fn set_exit_fees(&mut self, caller: Pubkey, bps: u16) -> Result<()> {
        self.require_owner(&caller)?;
        self.state.fees.set_exit_fees(bps)
    }

    pub fn set_strategist_payout_address(&mut self, caller: Pubkey, payout: Pubkey) -> Result<()> {
        self.require_owner(&caller)?;
        self.state.fees.set_strategist_payout(payout);
        Ok(())
    }

    pub fn set_high_water_mark_reset_threshold(&mut self, caller: Pubkey, threshold: u128) -> Result<()> {
        self.require_owner(&caller)?;
        self.state
            .fees
            .set_high_water_mark_reset_threshold(threshold)
    }

    /// Protocol-wide setting: only the registry owner may change it
    pub fn set_strategist_platform_cut(&mut self, caller: Pubkey, cut: u128) -> Result<()> {
        self.require_registry_owner(&caller)?;
        self.state.fees.set_strategist_cut(cut)
    }

    pub fn set_rebalance_deviation(&mut self, caller: Pubkey, deviation: u128) -> Result<()> {
        self.require_owner(&caller)?;
        require!(
            deviation <= MAX_REBALANCE_DEVIATION,
            FundError::InvalidDeviation
        );
        self.state.max_rebalance_deviation = deviation;
        Ok(())
    }

    /// Settle at the current mark, then move the mark by the net-of-fee
    /// performance since the previous reset
    pub fn reset_high_water_mark(&mut self, caller: Pubkey) -> Result<HighWaterMarkResetReceipt> {
        self.require_owner(&caller)?;
        self.atomically(|fund| {
            let total_assets = fund.total_assets()?;
            require!(
                fund.state
                    .fees
                    .can_reset_high_water_mark(total_assets, fund.now)?,
                FundError::HighWaterMarkNotYetExpired
            );
            let performance = fund.state.fees.performance_since_reset(total_assets)?;
            let previous = fund.state.fees.high_water_mark;

            let (fees, _) = fund.settle_fees()?;
            let high_water_mark = fund
                .state
                .fees
                .reset_high_water_mark_price(previous, performance)?;
            fund.state
                .fees
                .mark_reset(high_water_mark, total_assets, fund.now);

            msg!(
                "High-water mark reset: {} -> {} (performance {})",
                previous,
                high_water_mark,
                performance
            );
            Ok(HighWaterMarkResetReceipt {
                previous,
                high_water_mark,
                performance,
                fees,
            })
        })
    }

    /// Settle, then hand every fee collector share to the strategist and
    /// the platform according to the strategist cut
    pub fn payout_fees(&mut self) -> Result<FeePayout> {
        self.atomically(|fund| {
            let (fees, _) = fund.settle_fees()?;
            let shares = fund.state.fee_collector_shares;

            let strategist_shares =
                to_u64(wad_mul(shares as u128, fund.state.fees.strategist_cut)?)?;
            let strategist = fund.state.fees.strategist_payout;
            if strategist_shares > 0 {
                require!(strategist.is_some(), FundError::StrategistPayoutNotSet);
            }
            let platform_shares = shares
                .checked_sub(strategist_shares)
                .ok_or(FundError::MathOverflow)?;

            fund.state.fee_collector_shares = 0;
            Ok(FeePayout {
                strategist,
                strategist_shares,
                platform: fund.registry.platform_payout,
                platform_shares,
                fees,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::FeeState;
    use crate::state::{AssetPrice, PriceSheet};

    struct Fixture {
        state: FundState,
        registry: ProtocolRegistry,
        prices: PriceSheet,
        owner: Pubkey,
        lending: PositionKey,
    }

    impl Fixture {
        fn fund(&mut self, now: i64) -> Fund<'_> {
            Fund::new(&mut self.state, &self.registry, &self.prices, now)
        }
    }

    fn code_of(error: Error) -> u32 {
        match error {
            Error::AnchorError(e) => e.error_code_number,
            Error::ProgramError(_) => u32::MAX,
        }
    }

    fn assert_fund_error<T: std::fmt::Debug>(result: Result<T>, expected: FundError) {
        assert_eq!(code_of(result.unwrap_err()), code_of(expected.into()));
    }

    fn fixture() -> Fixture {
        let owner = Pubkey::new_unique();
        let base = Pubkey::new_unique();
        let holding = PositionKey::holding(base).unwrap();
        let lending = PositionKey::market(AdaptorId::Lending, Pubkey::new_unique(), base).unwrap();

        let mut registry = ProtocolRegistry {
            authority: Pubkey::new_unique(),
            platform_payout: Pubkey::new_unique(),
            trusted_positions: Vec::new(),
            bump: 0,
        };
        registry.trust_position(holding.clone(), "Holding".to_string()).unwrap();
        registry.trust_position(lending.clone(), "Lending".to_string()).unwrap();

        let prices = PriceSheet {
            registry: Pubkey::new_unique(),
            prices: vec![AssetPrice {
                mint: base,
                decimals: 6,
                usd_price: WAD,
                updated_at: 0,
            }],
            bump: 0,
        };
        let state = FundState::new(
            Pubkey::new_unique(),
            owner,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            base,
            Pubkey::new_unique(),
            100,
            FeeState::new(0),
        );

        let mut fixture = Fixture {
            state,
            registry,
            prices,
            owner,
            lending: lending.clone(),
        };
        let mut fund = fixture.fund(0);
        fund.add_position(owner, 0, holding.clone(), false, true).unwrap();
        fund.add_position(owner, 1, lending, false, true).unwrap();
        fund.set_holding_position(owner, holding).unwrap();
        fixture
    }

    #[test]
    fn test_first_deposit_floor() {
        let mut f = fixture();
        let mut fund = f.fund(0);

        assert_fund_error(fund.deposit(99), FundError::InitialDepositTooSmall);
        let receipt = fund.deposit(100).unwrap();
        assert_eq!(receipt.shares, 100);
        // Later deposits are not floored
        assert_eq!(fund.deposit(1).unwrap().shares, 1);
    }

    #[test]
    fn test_nested_operation_is_rejected() {
        let mut f = fixture();
        let mut fund = f.fund(0);

        let nested = fund.atomically(|inner| inner.deposit(1_000));
        assert_fund_error(nested, FundError::Reentrancy);
        assert!(!fund.state().locked);
        assert_eq!(fund.state().total_supply, 0);

        // The lock is released, so a top-level call goes through
        assert!(fund.deposit(1_000).is_ok());
    }

    #[test]
    fn test_failed_rebalance_restores_state() {
        let mut f = fixture();
        let owner = f.owner;
        let lending = f.lending.clone();
        let mut fund = f.fund(0);
        fund.deposit(10_000).unwrap();
        let before = fund.state().clone();

        // Supplying works but sending value to an outsider breaks the tolerance
        let calls = vec![
            AdaptorCall {
                adaptor: AdaptorId::Lending,
                config: lending.config.clone(),
                action: AdaptorAction::Deposit { amount: 5_000 },
            },
            AdaptorCall {
                adaptor: AdaptorId::Lending,
                config: lending.config,
                action: AdaptorAction::Withdraw {
                    amount: 1_000,
                    receiver: Pubkey::new_unique(),
                },
            },
        ];
        assert_fund_error(
            fund.rebalance(owner, &calls),
            FundError::RebalanceDeviationExceeded,
        );

        let after = fund.state();
        assert_eq!(after.custody, before.custody);
        assert_eq!(after.total_supply, before.total_supply);
        assert_eq!(after.fees, before.fees);
        assert!(!after.locked);
    }

    #[test]
    fn test_exit_checks_shares_and_liquidity() {
        let mut f = fixture();
        let owner = f.owner;
        let lending = f.lending.clone();
        let receiver = Pubkey::new_unique();
        let mut fund = f.fund(0);
        fund.deposit(1_000).unwrap();

        assert_fund_error(
            fund.redeem(500, receiver, 499),
            FundError::InsufficientShares,
        );

        // Lend everything out and lock most of it in the market
        let calls = vec![AdaptorCall {
            adaptor: AdaptorId::Lending,
            config: lending.config.clone(),
            action: AdaptorAction::Deposit { amount: 1_000 },
        }];
        fund.rebalance(owner, &calls).unwrap();
        fund.state.custody.report_book(&lending, 1_000, 800).unwrap();

        assert_eq!(fund.total_assets_withdrawable().unwrap(), 200);
        assert_eq!(fund.max_withdraw(1_000).unwrap(), 200);
        assert_eq!(fund.max_redeem(1_000).unwrap(), 200);
        assert_fund_error(
            fund.withdraw(201, receiver, 1_000),
            FundError::InsufficientLiquidity,
        );

        let receipt = fund.withdraw(200, receiver, 1_000).unwrap();
        assert_eq!(receipt.shares, 200);
        assert_eq!(receipt.payouts.len(), 1);
        assert_eq!(receipt.payouts[0].amount, 200);
        assert_eq!(receipt.payouts[0].receiver, receiver);
    }

    #[test]
    fn test_roles() {
        let mut f = fixture();
        let stranger = Pubkey::new_unique();
        let registry_owner = f.registry.authority;
        let owner = f.owner;
        let mut fund = f.fund(0);

        assert_fund_error(fund.set_enter_fees(stranger, 10), FundError::NotFundOwner);
        assert_fund_error(fund.rebalance(stranger, &[]), FundError::NotStrategist);
        // Fund owner cannot change the protocol-wide cut
        assert_fund_error(
            fund.set_strategist_platform_cut(owner, WAD / 2),
            FundError::NotRegistryOwner,
        );
        fund.set_strategist_platform_cut(registry_owner, WAD / 2).unwrap();
        assert_eq!(fund.state().fees.strategist_cut, WAD / 2);
    }
}
