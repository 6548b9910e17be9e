use std::any::type_name;

use base64::prelude::*;
use bincode::Options;
use litesvm::types::TransactionMetadata;
use solana_client::rpc_response::RpcSimulateTransactionResult;
use solana_packet::PACKET_DATA_SIZE;
use solana_transaction_error::TransactionError;
use solana_transaction_status::TransactionBinaryEncoding;

use crate::error::{BanksimError, BanksimResult};

const MAX_BASE58_SIZE: usize = 1683; // Golden, bump if PACKET_DATA_SIZE changes
const MAX_BASE64_SIZE: usize = 1644; // Golden, bump if PACKET_DATA_SIZE changes

/// Decodes a base-58 or base-64 encoded wire payload and deserializes it.
pub fn decode_and_deserialize<T>(
    encoded: &str,
    encoding: TransactionBinaryEncoding,
) -> BanksimResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let wire_output = match encoding {
        TransactionBinaryEncoding::Base58 => {
            if encoded.len() > MAX_BASE58_SIZE {
                return Err(BanksimError::deserialize_error(
                    type_name::<T>(),
                    format!(
                        "base58 encoded payload too large: {} bytes (max: encoded/raw {}/{})",
                        encoded.len(),
                        MAX_BASE58_SIZE,
                        PACKET_DATA_SIZE,
                    ),
                ));
            }
            bs58::decode(encoded).into_vec().map_err(|e| {
                BanksimError::deserialize_error(type_name::<T>(), format!("invalid base58: {e}"))
            })?
        }
        TransactionBinaryEncoding::Base64 => {
            if encoded.len() > MAX_BASE64_SIZE {
                return Err(BanksimError::deserialize_error(
                    type_name::<T>(),
                    format!(
                        "base64 encoded payload too large: {} bytes (max: encoded/raw {}/{})",
                        encoded.len(),
                        MAX_BASE64_SIZE,
                        PACKET_DATA_SIZE,
                    ),
                ));
            }
            BASE64_STANDARD.decode(encoded).map_err(|e| {
                BanksimError::deserialize_error(type_name::<T>(), format!("invalid base64: {e}"))
            })?
        }
    };
    deserialize_wire::<T>(&wire_output)
}

/// Deserializes raw wire bytes, bounded by the network packet size.
pub fn deserialize_wire<T>(wire: &[u8]) -> BanksimResult<T>
where
    T: serde::de::DeserializeOwned,
{
    if wire.len() > PACKET_DATA_SIZE {
        return Err(BanksimError::deserialize_error(
            type_name::<T>(),
            format!(
                "payload too large: {} bytes (max: {} bytes)",
                wire.len(),
                PACKET_DATA_SIZE
            ),
        ));
    }
    bincode::options()
        .with_limit(PACKET_DATA_SIZE as u64)
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .deserialize_from(wire)
        .map_err(|err| BanksimError::deserialize_error(type_name::<T>(), err))
}

/// Shapes engine metadata the way `simulateTransaction` reports it. Return data is always
/// present, even when the program set none.
pub fn get_simulate_transaction_result(
    metadata: &TransactionMetadata,
    error: Option<TransactionError>,
) -> RpcSimulateTransactionResult {
    RpcSimulateTransactionResult {
        accounts: None,
        err: error.map(|e| e.into()),
        inner_instructions: None,
        logs: Some(metadata.logs.clone()),
        replacement_blockhash: None,
        return_data: Some(metadata.return_data.clone().into()),
        units_consumed: Some(metadata.compute_units_consumed),
        loaded_accounts_data_size: None,
        fee: Some(metadata.fee),
        pre_balances: None,
        post_balances: None,
        pre_token_balances: None,
        post_token_balances: None,
        loaded_addresses: None,
    }
}

#[cfg(test)]
mod tests {
    use solana_hash::Hash;
    use solana_keypair::Keypair;
    use solana_message::Message;
    use solana_signer::Signer;
    use solana_system_interface::instruction as system_instruction;
    use solana_transaction::{Transaction, versioned::VersionedTransaction};
    use test_case::test_case;

    use super::*;

    fn signed_transfer() -> VersionedTransaction {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Keypair::new().pubkey(), 1);
        let message = Message::new(&[ix], Some(&payer.pubkey()));
        Transaction::new(&[&payer], message, Hash::default()).into()
    }

    #[test]
    fn test_deserialize_wire_transaction() {
        let tx = signed_transfer();
        let wire = bincode::serialize(&tx).unwrap();
        let decoded: VersionedTransaction = deserialize_wire(&wire).unwrap();
        assert_eq!(decoded.signatures, tx.signatures);
    }

    #[test_case(TransactionBinaryEncoding::Base58 ; "base58")]
    #[test_case(TransactionBinaryEncoding::Base64 ; "base64")]
    fn test_decode_encoded_transaction(encoding: TransactionBinaryEncoding) {
        let tx = signed_transfer();
        let wire = bincode::serialize(&tx).unwrap();
        let encoded = match encoding {
            TransactionBinaryEncoding::Base58 => bs58::encode(&wire).into_string(),
            TransactionBinaryEncoding::Base64 => BASE64_STANDARD.encode(&wire),
        };
        let decoded: VersionedTransaction = decode_and_deserialize(&encoded, encoding).unwrap();
        assert_eq!(decoded.signatures[0], tx.signatures[0]);
    }

    #[test]
    fn test_malformed_wire_bytes() {
        let err = deserialize_wire::<VersionedTransaction>(&[0xff, 0x01]).unwrap_err();
        assert!(err.message().starts_with("Failed to deserialize"));

        let oversized = vec![0u8; PACKET_DATA_SIZE + 1];
        assert!(deserialize_wire::<VersionedTransaction>(&oversized).is_err());

        let err = decode_and_deserialize::<VersionedTransaction>(
            "not base64!",
            TransactionBinaryEncoding::Base64,
        );
        assert!(err.is_err());
    }
}
