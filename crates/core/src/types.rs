use litesvm::types::TransactionMetadata;
use solana_clock::{Slot, UnixTimestamp};
use solana_program_pack::Pack;
use solana_pubkey::Pubkey;
use solana_transaction_context::TransactionReturnData;
use solana_transaction_error::TransactionError;
use spl_token_2022_interface::extension::StateWithExtensions;

use crate::error::{BanksimError, BanksimResult};

/// Everything kept about a transaction the connection has submitted.
///
/// Records are written once, right after the engine accepts the transaction, and are never
/// updated or evicted for the lifetime of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Base-58 encoding of the transaction's first signature.
    pub signature: String,
    pub err: Option<TransactionError>,
    pub log_messages: Vec<String>,
    pub compute_units_consumed: u64,
    pub fee: u64,
    pub return_data: TransactionReturnData,
    /// Slot the engine was at when it processed the transaction.
    pub slot: Slot,
}

impl TransactionRecord {
    pub fn from_metadata(meta: &TransactionMetadata, slot: Slot) -> Self {
        Self {
            signature: meta.signature.to_string(),
            err: None,
            log_messages: meta.logs.clone(),
            compute_units_consumed: meta.compute_units_consumed,
            fee: meta.fee,
            return_data: meta.return_data.clone(),
            slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeTravelError {
    TimestampOverflow { current: UnixTimestamp, seconds: i64 },
}

impl std::fmt::Display for TimeTravelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeTravelError::TimestampOverflow { current, seconds } => {
                write!(
                    f,
                    "Timestamp overflow: current={}, seconds={}",
                    current, seconds
                )
            }
        }
    }
}

impl std::error::Error for TimeTravelError {}

impl From<TimeTravelError> for BanksimError {
    fn from(e: TimeTravelError) -> Self {
        BanksimError::time_travel(e)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenAccount {
    SplToken2022(spl_token_2022_interface::state::Account),
    SplToken(spl_token_interface::state::Account),
}

impl TokenAccount {
    pub fn token_program_id(&self) -> Pubkey {
        match self {
            Self::SplToken2022(_) => spl_token_2022_interface::id(),
            Self::SplToken(_) => spl_token_interface::id(),
        }
    }

    /// Decodes an account's data using the token program that owns it. Token-2022 accounts
    /// may carry extensions; accounts owned by any other program are rejected.
    pub fn unpack(program_id: &Pubkey, bytes: &[u8]) -> BanksimResult<Self> {
        if *program_id == spl_token_interface::id() {
            spl_token_interface::state::Account::unpack(bytes)
                .map(Self::SplToken)
                .map_err(|_| BanksimError::unpack_token_account())
        } else if *program_id == spl_token_2022_interface::id() {
            StateWithExtensions::<spl_token_2022_interface::state::Account>::unpack(bytes)
                .map(|account| Self::SplToken2022(account.base))
                .map_err(|_| BanksimError::unpack_token_account())
        } else {
            Err(BanksimError::unpack_token_account())
        }
    }

    pub fn owner(&self) -> Pubkey {
        match self {
            Self::SplToken2022(account) => account.owner,
            Self::SplToken(account) => account.owner,
        }
    }

    pub fn mint(&self) -> Pubkey {
        match self {
            Self::SplToken2022(account) => account.mint,
            Self::SplToken(account) => account.mint,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::SplToken2022(account) => account.amount,
            Self::SplToken(account) => account.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_spl_token_account() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let account = spl_token_interface::state::Account {
            mint,
            owner,
            amount: 1_500,
            state: spl_token_interface::state::AccountState::Initialized,
            ..Default::default()
        };
        let mut data = vec![0u8; spl_token_interface::state::Account::LEN];
        account.pack_into_slice(&mut data);

        let token_account = TokenAccount::unpack(&spl_token_interface::id(), &data).unwrap();
        assert!(matches!(token_account, TokenAccount::SplToken(_)));
        assert_eq!(token_account.token_program_id(), spl_token_interface::id());
        assert_eq!(token_account.owner(), owner);
        assert_eq!(token_account.mint(), mint);
        assert_eq!(token_account.amount(), 1_500);
    }

    #[test]
    fn test_unpack_garbage_fails() {
        let err = TokenAccount::unpack(&spl_token_interface::id(), &[1, 2, 3]).unwrap_err();
        assert_eq!(err.message(), "Failed to unpack token account");
    }

    #[test]
    fn test_unpack_follows_owning_program() {
        let account = spl_token_2022_interface::state::Account {
            mint: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            amount: 9,
            state: spl_token_2022_interface::state::AccountState::Initialized,
            ..Default::default()
        };
        let mut data = vec![0u8; spl_token_2022_interface::state::Account::LEN];
        account.pack_into_slice(&mut data);

        let token_account = TokenAccount::unpack(&spl_token_2022_interface::id(), &data).unwrap();
        assert!(matches!(token_account, TokenAccount::SplToken2022(_)));
        assert_eq!(token_account.token_program_id(), spl_token_2022_interface::id());
        assert_eq!(token_account.amount(), 9);

        let err = TokenAccount::unpack(&Pubkey::new_unique(), &data).unwrap_err();
        assert_eq!(err.message(), "Failed to unpack token account");
    }

    #[test]
    fn test_time_travel_error_display() {
        assert_eq!(
            TimeTravelError::TimestampOverflow {
                current: 5,
                seconds: i64::MAX
            }
            .to_string(),
            format!("Timestamp overflow: current=5, seconds={}", i64::MAX)
        );
    }
}
