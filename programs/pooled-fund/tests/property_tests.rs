/// Property tests for share conversions, fee accrual and the rebalance guard
mod common;

use anchor_lang::prelude::*;
use common::*;
use pooled_fund::{
    adaptors::AdaptorId,
    constants::*,
    fund::{AdaptorAction, AdaptorCall},
};
use proptest::prelude::*;

const PERCENT: u128 = WAD / 100;

/// Fund holding `assets` for `supply` shares (assets >= supply), with the
/// given enter/exit fees
fn priced_fund(supply: u64, assets: u64, enter_fee_bps: u16, exit_fee_bps: u16) -> TestFund {
    let mut f = test_fund();
    let owner = f.owner;
    let base = f.base;
    f.fund(0).deposit(supply).unwrap();
    f.airdrop(base, assets - supply);

    let mut fund = f.fund(0);
    fund.set_enter_fees(owner, enter_fee_bps).unwrap();
    fund.set_exit_fees(owner, exit_fee_bps).unwrap();
    f
}

proptest! {
    #[test]
    fn test_mint_round_trip(
        supply in MIN_INITIAL_DEPOSIT..1_000_000_000_000u64,
        extra in 0u64..1_000_000_000_000u64,
        enter_fee_bps in 0u16..=MAX_ENTER_EXIT_FEE_BPS,
        shares in 1u64..1_000_000_000u64,
    ) {
        let mut f = priced_fund(supply, supply + extra, enter_fee_bps, 0);
        let fund = f.fund(0);

        let assets = fund.preview_mint(shares).unwrap();
        prop_assert_eq!(fund.preview_deposit(assets).unwrap(), shares);
    }

    #[test]
    fn test_redeem_round_trip(
        supply in MIN_INITIAL_DEPOSIT..1_000_000_000_000u64,
        extra in 0u64..1_000_000_000_000u64,
        exit_fee_bps in 0u16..=MAX_ENTER_EXIT_FEE_BPS,
        shares in 1u64..1_000_000_000u64,
    ) {
        prop_assume!(shares <= supply);
        let mut f = priced_fund(supply, supply + extra, 0, exit_fee_bps);
        let fund = f.fund(0);

        let assets = fund.preview_redeem(shares).unwrap();
        prop_assume!(assets > 0);
        let back = fund.preview_withdraw(assets).unwrap();
        prop_assert!(back <= shares && back + 1 >= shares, "{} -> {} -> {}", shares, assets, back);
    }

    #[test]
    fn test_redeem_round_trip_without_fees_is_exact(
        supply in MIN_INITIAL_DEPOSIT..1_000_000_000_000u64,
        extra in 0u64..1_000_000_000_000u64,
        shares in 1u64..1_000_000_000u64,
    ) {
        prop_assume!(shares <= supply);
        let mut f = priced_fund(supply, supply + extra, 0, 0);
        let fund = f.fund(0);

        let assets = fund.preview_redeem(shares).unwrap();
        prop_assert_eq!(fund.preview_withdraw(assets).unwrap(), shares);
    }

    #[test]
    fn test_fees_never_decrease(
        steps in proptest::collection::vec((0u8..3, 1u64..10_000_000u64, 0i64..30 * SECONDS_PER_DAY), 1..24),
    ) {
        let mut f = test_fund_with(|fees| {
            fees.set_management_fees_per_year(2 * PERCENT).unwrap();
            fees.set_performance_fees(20 * PERCENT).unwrap();
        });
        let user = Pubkey::new_unique();
        let base = f.base;
        f.fund(0).deposit(100_000_000).unwrap();

        let mut now = 0;
        let mut high_water_mark = f.state.fees.high_water_mark;
        let mut collected = f.state.fee_collector_shares;
        for (kind, amount, elapsed) in steps {
            now += elapsed;
            // Rejected operations are fine; they must not move fee state back
            let _ = match kind {
                0 => f.fund(now).deposit(amount).map(|_| ()),
                1 => {
                    let owned = f.state.circulating_shares();
                    f.fund(now).redeem(amount.min(owned), user, owned).map(|_| ())
                }
                _ => {
                    f.airdrop(base, amount);
                    Ok(())
                }
            };

            prop_assert!(f.state.fees.high_water_mark >= high_water_mark);
            prop_assert!(f.state.fee_collector_shares >= collected);
            high_water_mark = f.state.fees.high_water_mark;
            collected = f.state.fee_collector_shares;
        }
    }

    #[test]
    fn test_rebalance_deviation_is_enforced(
        deposit in MIN_INITIAL_DEPOSIT..1_000_000_000_000u64,
        leaked in 1u64..1_000_000_000u64,
        deviation in 0u128..=MAX_REBALANCE_DEVIATION,
    ) {
        prop_assume!(leaked <= deposit);
        let mut f = test_fund();
        let owner = f.owner;
        let strategist = f.strategist;
        f.fund(0).deposit(deposit).unwrap();
        f.fund(0).set_rebalance_deviation(owner, deviation).unwrap();

        let call = AdaptorCall {
            adaptor: AdaptorId::Holding,
            config: f.holding.config.clone(),
            action: AdaptorAction::Withdraw {
                amount: leaked,
                receiver: Pubkey::new_unique(),
            },
        };
        let moved = (leaked as u128 * WAD).div_ceil(deposit as u128);
        let result = f.fund(0).rebalance(strategist, &[call]);

        if moved > deviation {
            prop_assert!(result.is_err());
            prop_assert_eq!(f.fund(0).total_assets().unwrap(), deposit);
            prop_assert!(f.state.custody.outbound.is_empty());
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(f.fund(0).total_assets().unwrap(), deposit - leaked);
        }
    }
}
