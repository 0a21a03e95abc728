use anchor_lang::prelude::*;
use pooled_fund::{
    constants::*,
    errors::FundError,
    instructions::{transfers::fund_authority_seeds, InitializeFundParams},
    state::{FundState, PriceSheet, ProtocolRegistry},
};

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> InitializeFundParams {
        InitializeFundParams {
            strategist: Pubkey::new_unique(),
            min_initial_deposit: 1_000_000,
            enter_fee_bps: 50,
            exit_fee_bps: 50,
            management_fee_per_year: WAD / 50,
            performance_fee: WAD / 5,
            high_water_mark_reset_threshold: WAD / 10,
        }
    }

    fn code_of(error: Error) -> u32 {
        match error {
            Error::AnchorError(e) => e.error_code_number,
            Error::ProgramError(_) => u32::MAX,
        }
    }

    #[test]
    fn test_pda_derivation() {
        let program_id = pooled_fund::id();
        let asset_mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        // Derive fund state PDA
        let (fund_state, _) = Pubkey::find_program_address(
            &[FUND_SEED, asset_mint.as_ref(), owner.as_ref()],
            &program_id,
        );

        // Derive share mint PDA
        let (share_mint, _) = Pubkey::find_program_address(
            &[SHARE_MINT_SEED, fund_state.as_ref()],
            &program_id,
        );

        // Derive fund authority PDA
        let (fund_authority, authority_bump) = Pubkey::find_program_address(
            &[FUND_AUTHORITY_SEED, fund_state.as_ref()],
            &program_id,
        );

        // Verify PDAs are unique
        assert_ne!(fund_state, share_mint);
        assert_ne!(fund_state, fund_authority);
        assert_ne!(share_mint, fund_authority);

        // Signer seeds rebuild the same authority
        let bump = [authority_bump];
        let seeds = fund_authority_seeds(&fund_state, &bump);
        let rebuilt = Pubkey::create_program_address(&seeds, &program_id).unwrap();
        assert_eq!(rebuilt, fund_authority);
    }

    #[test]
    fn test_funds_are_unique_per_owner_and_asset() {
        let program_id = pooled_fund::id();
        let asset_mint = Pubkey::new_unique();
        let owner_1 = Pubkey::new_unique();
        let owner_2 = Pubkey::new_unique();

        let (fund_1, _) = Pubkey::find_program_address(
            &[FUND_SEED, asset_mint.as_ref(), owner_1.as_ref()],
            &program_id,
        );
        let (fund_2, _) = Pubkey::find_program_address(
            &[FUND_SEED, asset_mint.as_ref(), owner_2.as_ref()],
            &program_id,
        );
        assert_ne!(fund_1, fund_2, "Each owner gets its own fund per asset");

        // Registry and price sheet are protocol-wide singletons
        let (registry, _) = Pubkey::find_program_address(&[REGISTRY_SEED], &program_id);
        let (prices, _) = Pubkey::find_program_address(&[PRICE_SHEET_SEED], &program_id);
        assert_ne!(registry, prices);
    }

    #[test]
    fn test_account_sizes_fit() {
        // Accounts created with a single init must stay under 10KiB
        assert!(FundState::SPACE <= 10_240, "FundState is {} bytes", FundState::SPACE);
        assert!(ProtocolRegistry::SPACE <= 10_240);
        assert!(PriceSheet::SPACE <= 10_240);
    }

    #[test]
    fn test_initialize_params_validation() {
        let fees = params().fee_state(42).unwrap();
        assert_eq!(fees.enter_fee_bps, 50);
        assert_eq!(fees.performance_fee, WAD / 5);
        assert!(fees.management_rate > 0);
        assert_eq!(fees.last_management_claim, 42);
        assert_eq!(fees.high_water_mark_reset_time, 42);
        // The mark starts on the first join
        assert_eq!(fees.high_water_mark, 0);

        let mut zero_floor = params();
        zero_floor.min_initial_deposit = 0;
        assert_eq!(
            code_of(zero_floor.fee_state(0).unwrap_err()),
            code_of(FundError::InvalidMinimumDeposit.into())
        );

        let mut greedy = params();
        greedy.performance_fee = MAX_PERFORMANCE_FEE + 1;
        assert_eq!(
            code_of(greedy.fee_state(0).unwrap_err()),
            code_of(FundError::InvalidFeeRate.into())
        );
    }
}
