use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    // ── authorization ──
    #[msg("Signer is not the protocol owner")]
    NotOwner,

    #[msg("Signer is not the owner of this self-staking token")]
    NotSelfStakingERC20Owner,

    #[msg("Signer is not a registered minter")]
    NotMinter,

    #[msg("Only the token owner may change minters")]
    NotMinterOwner,

    #[msg("Signer is not a reward manager")]
    NotRewardManager,

    #[msg("Signer is not a delegated claimer")]
    NotDelegatedClaimer,

    // ── invalid input ──
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Address must not be the default key")]
    ZeroAddress,

    #[msg("Reward window is malformed")]
    InvalidParameters,

    #[msg("Reward amount would overflow reward accounting")]
    TooMuch,

    #[msg("Holder balance is too low")]
    InsufficientBalance,

    #[msg("Invalid timestamp conversion")]
    InvalidTimestamp,

    #[msg("Invalid parameter provided")]
    InvalidParam,

    #[msg("Missing remaining account")]
    MissingRemainingAccount,

    // ── stablecoin registry ──
    #[msg("Token is not a supported stablecoin")]
    TokenNotSupported,

    #[msg("Stablecoin is already registered")]
    StablecoinAlreadyExists,

    #[msg("Stablecoin is not registered")]
    StablecoinDoesNotExist,

    #[msg("Built-in stablecoins cannot be removed")]
    StablecoinBakedIn,

    #[msg("Stablecoin registry is full")]
    RegistryFull,

    // ── upgrades ──
    #[msg("Upgrade must move to a newer contract version")]
    UpgradeToSameVersion,

    #[msg("Contract version cannot move backwards")]
    UpgradeToOlderVersion,

    #[msg("Upgrade target uses a different reward token")]
    WrongRewardToken,

    // ── exit queue ──
    #[msg("Exit queue has no free slot")]
    QueueFull,

    #[msg("Payout token account does not belong to the queued holder")]
    InvalidPayoutAccount,

    // ── pools ──
    #[msg("Neither pool coin is REUSD")]
    PoolWithoutREUSD,

    #[msg("Desired token is not a base pool coin")]
    DesiredTokenNotInBasePool,

    #[msg("Base pool must not contain REUSD")]
    BasePoolWithREUSD,

    #[msg("Pool accounts do not match the configured pool")]
    PoolMismatch,

    #[msg("Token cannot be routed through the pools")]
    UnsupportedToken,

    // ── bridge ──
    #[msg("Bridge instruction is not signed by a minter")]
    InvalidBridgeSignature,

    #[msg("Bridge instruction was already fulfilled")]
    DuplicateInstruction,

    #[msg("Signed instruction has expired")]
    DeadlineExpired,

    // ── roles / arithmetic ──
    #[msg("Role list is full")]
    RoleListFull,

    #[msg("Math operation overflowed or underflowed")]
    MathOverflow,
}
