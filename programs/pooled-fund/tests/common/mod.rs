#![allow(dead_code)]

use anchor_lang::prelude::*;
use pooled_fund::{
    adaptors::{AdaptorId, AssetBalance, PositionKey},
    constants::WAD,
    errors::FundError,
    fees::FeeState,
    fund::Fund,
    state::{AssetPrice, FundState, PriceSheet, ProtocolRegistry},
};

/// Base asset decimals used by every test fund
pub const BASE_DECIMALS: u8 = 6;

/// Minimum first deposit of the test fund
pub const MIN_INITIAL_DEPOSIT: u64 = 1_000;

/// A fund with its registry and price sheet, owned by the test
pub struct TestFund {
    pub state: FundState,
    pub registry: ProtocolRegistry,
    pub prices: PriceSheet,
    pub owner: Pubkey,
    pub strategist: Pubkey,
    pub base: Pubkey,
    pub holding: PositionKey,
    pub lending: PositionKey,
}

impl TestFund {
    /// The fund as seen by a call made at `now`
    pub fn fund(&mut self, now: i64) -> Fund<'_> {
        Fund::new(&mut self.state, &self.registry, &self.prices, now)
    }

    /// Identity the fund's custody acts as
    pub fn identity(&self) -> Pubkey {
        self.state.custody.owner
    }

    /// Simulate `amount` landing in the fund's token account for `mint` from
    /// outside, picked up on the next observation of holding balances
    pub fn airdrop(&mut self, mint: Pubkey, amount: u64) {
        let mut token_accounts = self.state.custody.token_accounts.clone();
        match token_accounts.iter_mut().find(|b| b.mint == mint) {
            Some(balance) => balance.amount += amount,
            None => token_accounts.push(AssetBalance { mint, amount }),
        }
        self.fund(0)
            .observe_holdings(|asset| {
                Ok(token_accounts
                    .iter()
                    .find(|b| b.mint == *asset)
                    .map_or(0, |b| b.amount))
            })
            .unwrap();
    }

    pub fn set_price(&mut self, mint: Pubkey, decimals: u8, usd_price: u128) {
        self.prices
            .set_price(AssetPrice {
                mint,
                decimals,
                usd_price,
                updated_at: 0,
            })
            .unwrap();
    }

    /// Trust `position` in the registry and append it to the fund ledger
    pub fn use_position(&mut self, position: &PositionKey, is_debt: bool, is_liquid: bool) {
        self.registry
            .trust_position(position.clone(), "Test".to_string())
            .unwrap();
        let strategist = self.strategist;
        let ledger = &self.state.positions;
        let index = if is_debt {
            ledger.debt.len()
        } else {
            ledger.credit.len()
        } as u32;
        self.fund(0)
            .add_position(strategist, index, position.clone(), is_debt, is_liquid)
            .unwrap();
    }
}

/// Fund priced 1:1 in USD, with a holding position (deposits) followed by a
/// liquid lending position in the base asset
pub fn test_fund_with(configure: impl FnOnce(&mut FeeState)) -> TestFund {
    let owner = Pubkey::new_unique();
    let strategist = Pubkey::new_unique();
    let base = Pubkey::new_unique();

    let mut fees = FeeState::new(0);
    configure(&mut fees);

    let registry = ProtocolRegistry {
        authority: Pubkey::new_unique(),
        platform_payout: Pubkey::new_unique(),
        trusted_positions: Vec::new(),
        bump: 0,
    };
    let prices = PriceSheet {
        registry: Pubkey::new_unique(),
        prices: Vec::new(),
        bump: 0,
    };
    let state = FundState::new(
        Pubkey::new_unique(),
        owner,
        strategist,
        Pubkey::new_unique(),
        base,
        Pubkey::new_unique(),
        MIN_INITIAL_DEPOSIT,
        fees,
    );

    let mut test_fund = TestFund {
        state,
        registry,
        prices,
        owner,
        strategist,
        base,
        holding: PositionKey::holding(base).unwrap(),
        lending: PositionKey::market(AdaptorId::Lending, Pubkey::new_unique(), base).unwrap(),
    };
    test_fund.set_price(base, BASE_DECIMALS, WAD);

    let holding = test_fund.holding.clone();
    let lending = test_fund.lending.clone();
    test_fund.use_position(&holding, false, true);
    test_fund.use_position(&lending, false, true);
    test_fund
        .fund(0)
        .set_holding_position(strategist, holding)
        .unwrap();
    test_fund
}

pub fn test_fund() -> TestFund {
    test_fund_with(|_| {})
}

pub fn code_of(error: Error) -> u32 {
    match error {
        Error::AnchorError(e) => e.error_code_number,
        Error::ProgramError(_) => u32::MAX,
    }
}

pub fn assert_fund_error<T: std::fmt::Debug>(result: Result<T>, expected: FundError) {
    assert_eq!(code_of(result.unwrap_err()), code_of(expected.into()));
}

/// `value` within `tolerance` (relative) of `expected`
pub fn assert_close(value: u64, expected: f64, tolerance: f64) {
    let error = ((value as f64 - expected) / expected).abs();
    assert!(
        error <= tolerance,
        "{} is not within {} of {}",
        value,
        tolerance,
        expected
    );
}
