//! Listener → rx → management choreography.

use std::sync::Arc;
use std::time::Duration;

use zeroize::Zeroizing;

use gateway_runtime::{Gateway, GatewayConfig, UnresolvedRetriever};
use wf_auth::{binary_address, MockSignatureFetcher, SignaturePayload};
use wf_bus::{EventFilter, MessageEventKind};
use wf_crypto::{derive_auth_token_hex, ecdsa};
use wf_listener::{FixtureCodec, ListenerConfig, MockChainRpc};
use wf_operations::{OperationsService, StoreAuthTokenRequest};
use wf_protocol::{
    ChainBlock, CryptoDataType, TransceiveDirection, VerificationMethod, WfMessage,
};
use wf_state::InMemoryDatastore;

const CHAIN: &str = "blockchain-test";
const PEER_ADDRESS: &str = "1f2e3d4c5b6a";

async fn started_gateway(fetcher: Arc<MockSignatureFetcher>) -> Gateway {
    let mut gateway = Gateway::new(
        GatewayConfig::for_testing(),
        Arc::new(InMemoryDatastore::new()),
        fetcher,
        Arc::new(UnresolvedRetriever::new()),
    )
    .unwrap();
    gateway.start().await.unwrap();
    gateway
}

/// Poll until the closure returns `Some`, or give up after two seconds.
async fn wait_for<T>(mut probe: impl FnMut() -> Option<T>) -> T {
    for _ in 0..100 {
        if let Some(value) = probe() {
            return value;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached within two seconds");
}

fn block_with_auth_message(number: u64, message: &WfMessage, pub_key: &str) -> ChainBlock {
    let mut element = FixtureCodec::element_for(message, &format!("0xauthtx{number}"));
    element.from_address = PEER_ADDRESS.to_string();
    element.pub_key = pub_key.to_string();
    ChainBlock {
        number,
        hash: format!("0xblock{number}"),
        elements: vec![element],
        ..ChainBlock::default()
    }
}

#[tokio::test]
async fn test_token_authentication_end_to_end() {
    let mut gateway = started_gateway(Arc::new(MockSignatureFetcher::new())).await;
    let state = gateway.state.clone();

    // The operator pre-shares a token with the expected originator.
    let ops = OperationsService::new(state.clone());
    let token_secret = "f00dfeed".repeat(8);
    let token_id = ops
        .store_auth_token(StoreAuthTokenRequest {
            name: "Expected Org".to_string(),
            blockchain: CHAIN.to_string(),
            address: String::new(),
            secret: Zeroizing::new(token_secret.clone()),
        })
        .await
        .unwrap();

    // The originator announces itself on chain with the derived value.
    let mut secret_bytes = Zeroizing::new(hex::decode(&token_secret).unwrap());
    let verification_data =
        derive_auth_token_hex(&mut secret_bytes, &binary_address(PEER_ADDRESS)).unwrap();
    let mut message = WfMessage::authentication(
        CHAIN,
        PEER_ADDRESS,
        VerificationMethod::Token,
        verification_data.as_str(),
    );
    message.meta_header.transceive_direction = Some(TransceiveDirection::Rx);

    let rpc = Arc::new(MockChainRpc::new());
    rpc.push_block(block_with_auth_message(1, &message, ""));
    rpc.push_empty_blocks(2);
    gateway.spawn_listener(
        ListenerConfig {
            starting_block: 1,
            ..ListenerConfig::for_testing(CHAIN)
        },
        rpc,
        Arc::new(FixtureCodec::new(CHAIN)),
    );

    // Listener crawls, the bridge promotes, management verifies.
    let originator = wait_for(|| {
        state
            .get_originator_data(PEER_ADDRESS)
            .filter(|o| o.authentication_valid)
    })
    .await;

    assert_eq!(originator.auth_token_id, token_id);
    assert_eq!(originator.name, "Expected Org");
    assert_eq!(originator.authentication_messages, vec!["0xauthtx1"]);

    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_signature_authentication_end_to_end() {
    let signing_secret = [0x4Eu8; 32];
    let sig_url = "https://organisation.int/whiteflag.json";

    // The originator's signature is published at its URL.
    let fetcher = Arc::new(MockSignatureFetcher::new());
    let jws = wf_auth::jws::create(
        &SignaturePayload {
            addr: PEER_ADDRESS.to_string(),
            orgname: "Signing Org".to_string(),
            url: sig_url.to_string(),
            ..SignaturePayload::default()
        },
        &hex::encode(signing_secret),
    )
    .unwrap();
    fetcher.publish(sig_url, &serde_json::to_string(&jws).unwrap());

    let mut gateway = started_gateway(fetcher).await;
    let state = gateway.state.clone();

    let mut message = WfMessage::authentication(
        CHAIN,
        PEER_ADDRESS,
        VerificationMethod::Signature,
        sig_url,
    );
    message.meta_header.transceive_direction = Some(TransceiveDirection::Rx);

    let rpc = Arc::new(MockChainRpc::new());
    rpc.push_block(block_with_auth_message(
        1,
        &message,
        &ecdsa::public_key_hex(&signing_secret).unwrap(),
    ));
    rpc.push_empty_blocks(2);
    gateway.spawn_listener(
        ListenerConfig {
            starting_block: 1,
            ..ListenerConfig::for_testing(CHAIN)
        },
        rpc,
        Arc::new(FixtureCodec::new(CHAIN)),
    );

    let originator = wait_for(|| {
        state
            .get_originator_data(PEER_ADDRESS)
            .filter(|o| o.authentication_valid)
    })
    .await;

    assert_eq!(originator.name, "Signing Org");
    assert_eq!(originator.url, sig_url);

    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sent_encrypted_message_pairs_with_iv_message() {
    let gateway = started_gateway(Arc::new(MockSignatureFetcher::new())).await;
    let mut committed = gateway
        .buses
        .tx
        .subscribe(EventFilter::kinds(vec![MessageEventKind::MessageCommitted]));

    // An encrypted message this gateway sent finishes processing.
    let mut sent = WfMessage::default();
    sent.meta_header.blockchain = CHAIN.to_string();
    sent.meta_header.transaction_hash = "0xsenttx".to_string();
    sent.meta_header.transceive_direction = Some(TransceiveDirection::Tx);
    sent.meta_header.encryption_init_vector = "00112233445566778899aabb".to_string();
    sent.message_header.message_code = 'P';
    sent.message_header.encryption_indicator = '1';
    gateway
        .buses
        .tx
        .emit(MessageEventKind::MessageProcessed, sent);

    // The management plane commits the paired IV message.
    let event = tokio::time::timeout(Duration::from_secs(2), committed.recv())
        .await
        .expect("iv message committed")
        .unwrap();
    let response = event.message;
    assert_eq!(response.crypto_data_type(), Some(CryptoDataType::InitVector1));
    assert_eq!(response.crypto_data(), Some("00112233445566778899aabb"));
    assert_eq!(response.message_header.reference_indicator, '3');
    assert_eq!(response.message_header.referenced_message, "0xsenttx");
    assert_eq!(response.message_header.encryption_indicator, '0');

    gateway.shutdown().await.unwrap();
}
