use solana_account::Account;
use solana_account_decoder::{UiAccount, UiAccountEncoding, encode_ui_account};
use solana_client::rpc_response::{Response as RpcResponse, RpcResponseContext};
use solana_pubkey::Pubkey;

use crate::{
    engine::{BanksEngine, EngineLocker},
    error::{BanksimError, BanksimResult},
    types::TokenAccount,
};

/// Reads accounts straight from the engine. Nothing is cached: every call sees the ledger
/// as it is at that moment.
pub struct AccountInfoResolver<E> {
    engine: EngineLocker<E>,
}

impl<E> Clone for AccountInfoResolver<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<E: BanksEngine> AccountInfoResolver<E> {
    pub fn new(engine: EngineLocker<E>) -> Self {
        Self { engine }
    }

    /// `Ok(None)` when the account does not exist.
    pub async fn get_account_info(&self, pubkey: &Pubkey) -> BanksimResult<Option<Account>> {
        self.engine
            .with_engine_reader(|engine| engine.get_account(pubkey))
            .await
    }

    pub async fn get_account_info_and_context(
        &self,
        pubkey: &Pubkey,
    ) -> BanksimResult<RpcResponse<Option<Account>>> {
        let (slot, value) = self
            .engine
            .with_engine_reader(|engine| {
                let account = engine.get_account(pubkey)?;
                Ok::<_, BanksimError>((engine.get_slot(), account))
            })
            .await?;
        Ok(RpcResponse {
            context: RpcResponseContext::new(slot),
            value,
        })
    }

    /// Resolves each key in turn. Missing accounts come back as `None` in their position.
    pub async fn get_multiple_accounts_info(
        &self,
        pubkeys: &[Pubkey],
    ) -> BanksimResult<Vec<Option<Account>>> {
        let mut accounts = Vec::with_capacity(pubkeys.len());
        for pubkey in pubkeys {
            accounts.push(self.get_account_info(pubkey).await?);
        }
        Ok(accounts)
    }

    /// Same as [`Self::get_account_info_and_context`], with the data rendered in `encoding`.
    pub async fn get_ui_account_info(
        &self,
        pubkey: &Pubkey,
        encoding: UiAccountEncoding,
    ) -> BanksimResult<RpcResponse<Option<UiAccount>>> {
        let RpcResponse { context, value } = self.get_account_info_and_context(pubkey).await?;
        Ok(RpcResponse {
            context,
            value: value.map(|account| encode_ui_account(pubkey, &account, encoding, None, None)),
        })
    }

    pub async fn get_token_account(&self, pubkey: &Pubkey) -> BanksimResult<TokenAccount> {
        let account = self
            .get_account_info(pubkey)
            .await?
            .ok_or(BanksimError::account_not_found(*pubkey))?;
        TokenAccount::unpack(&account.owner, &account.data)
    }
}
