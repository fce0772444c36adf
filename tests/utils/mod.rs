pub mod runtime;

pub const MASTER_FUNDS: u64 = 1_000_000_000;
pub const BUYER_FUNDS: u64 = 1_000_000_000;
pub const FEE: u64 = 1000;

use amplify::Display;

/// Accounts which may hold units of the minted asset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
#[display(lowercase)]
pub enum Holder {
    Mint,
    Holdings,
    Burn,
    Master,
    Buyer,
}

impl Holder {
    pub const ALL: [Holder; 5] =
        [Holder::Mint, Holder::Holdings, Holder::Burn, Holder::Master, Holder::Buyer];
}
