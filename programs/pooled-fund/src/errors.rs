use anchor_lang::prelude::*;

/// Custom error codes for the Pooled Fund program
///
/// Grouped by kind: configuration, authorization, accounts, liquidity,
/// integration, deviation, temporal, then arithmetic and argument errors.
#[error_code]
pub enum FundError {
    // Configuration
    #[msg("Fee rate exceeds the allowed maximum")]
    InvalidFeeRate,

    #[msg("Strategist fee cut must be at most 100%")]
    InvalidFeeCut,

    #[msg("Rebalance deviation exceeds the allowed maximum")]
    InvalidDeviation,

    #[msg("High-water-mark reset threshold must be between 0 and 100%")]
    InvalidResetThreshold,

    #[msg("Minimum initial deposit must be greater than zero")]
    InvalidMinimumDeposit,

    // Authorization
    #[msg("Unauthorized - caller is not the fund owner")]
    NotFundOwner,

    #[msg("Unauthorized - caller is not the registry owner")]
    NotRegistryOwner,

    #[msg("Unauthorized - caller is neither the strategist nor the fund owner")]
    NotStrategist,

    // Accounts
    #[msg("Invalid mint")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    // Liquidity
    #[msg("Requested assets exceed what the fund can pay out right now")]
    InsufficientLiquidity,

    #[msg("Owner does not hold enough shares")]
    InsufficientShares,

    #[msg("Fund custody holds less than the requested amount")]
    InsufficientBalance,

    // Integration
    #[msg("Asset is not supported by the price oracle")]
    UnsupportedAsset,

    #[msg("Position is not trusted by the registry catalogue")]
    PositionNotTrusted,

    #[msg("Position is not part of this fund")]
    PositionNotUsed,

    #[msg("Position already exists in the fund or catalogue")]
    PositionAlreadyUsed,

    #[msg("Adaptor does not allow this operation for users")]
    UserOperationNotPermitted,

    #[msg("Adaptor does not allow this operation for the strategist")]
    StrategistOperationNotPermitted,

    #[msg("Position configuration could not be decoded")]
    InvalidPositionConfig,

    #[msg("Payout destination token account is missing or invalid")]
    InvalidPayoutAccount,

    // Deviation
    #[msg("Rebalance moved total assets beyond the allowed deviation")]
    RebalanceDeviationExceeded,

    // Temporal
    #[msg("High-water mark cannot be reset yet")]
    HighWaterMarkNotYetExpired,

    // Reentrancy
    #[msg("Fund operation already in progress")]
    Reentrancy,

    // Arithmetic
    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero")]
    DivisionByZero,

    #[msg("Exponent outside the supported domain")]
    ExponentOutOfRange,

    #[msg("Debt positions exceed credit positions")]
    NegativeNetAssets,

    // Arguments and ledger
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Operation results in zero shares")]
    ZeroShares,

    #[msg("First deposit is below the minimum initial deposit")]
    InitialDepositTooSmall,

    #[msg("Holding position has not been set")]
    HoldingPositionNotSet,

    #[msg("Holding position must be a credit position in the fund asset")]
    InvalidHoldingPosition,

    #[msg("Holding position cannot be removed")]
    RemovingHoldingPosition,

    #[msg("Position still holds a balance")]
    PositionNotEmpty,

    #[msg("Position index out of range")]
    InvalidPositionIndex,

    #[msg("Position list is full")]
    PositionsFull,

    #[msg("Debt flag does not match the adaptor")]
    DebtMismatch,

    #[msg("Position catalogue is full")]
    CatalogueFull,

    #[msg("Fund custody cannot track more assets or positions")]
    CustodyFull,

    #[msg("Price sheet is full")]
    PriceSheetFull,

    #[msg("Name too long - maximum 32 characters")]
    NameTooLong,

    #[msg("Position configuration too long")]
    ConfigTooLong,

    #[msg("Too many calls in one rebalance batch")]
    TooManyCalls,

    #[msg("Strategist payout address has not been set")]
    StrategistPayoutNotSet,

    // Reported and observed balances
    #[msg("Fund token account for a holding position is missing")]
    MissingHoldingAccount,

    #[msg("Holding balances are read from the fund token accounts")]
    HoldingBalanceObserved,

    #[msg("Locked amount exceeds the reported balance")]
    LockedExceedsBalance,

    #[msg("Platform payout address cannot be the default key")]
    InvalidPlatformPayout,
}
