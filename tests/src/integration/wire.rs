//! # Wire Compatibility and Delivery Edges
//!
//! The relay payloads are a compatibility contract: other engine
//! implementations must be able to produce and consume them. These tests
//! pin the JSON shapes and exercise delivery edge cases (duplicates,
//! garbage payloads) against a live requester engine.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use signon_bus::{AuthEvent, EventFilter};
    use signon_engine::{
        AuthEngine, AuthProtocolApi, EngineConfig, InMemoryPairing, InMemoryRelay, InMemoryStorage,
        RelayTransport,
    };
    use signon_types::{
        Account, AuthFailure, AuthRequestParams, AuthResponsePayload, CacaoSignature, RequestId,
        VerificationOutcome, WireMessage,
    };

    fn request_params(nonce: &str) -> AuthRequestParams {
        AuthRequestParams {
            chain_id: "eip155:1".to_string(),
            domain: "app.example.com".to_string(),
            aud: "https://app.example.com/login".to_string(),
            statement: None,
            nonce: nonce.to_string(),
            issued_at: "2024-05-01T12:00:00Z".to_string(),
            expiration_time: None,
            not_before: None,
            request_id: None,
            resources: vec![],
        }
    }

    fn app_engine(relay: &InMemoryRelay) -> AuthEngine {
        crate::init_tracing();
        AuthEngine::new(
            Arc::new(relay.client()),
            Arc::new(InMemoryPairing::new()),
            Arc::new(InMemoryStorage::new()),
            EngineConfig::default().with_response_timeout(Duration::from_secs(5)),
        )
    }

    // =========================================================================
    // JSON SHAPES
    // =========================================================================

    #[test]
    fn test_request_wire_shape() {
        let message = WireMessage::AuthRequest {
            id: RequestId(0xdead_beef),
            params: request_params("n1"),
        };
        let value: serde_json::Value =
            serde_json::from_slice(&message.to_bytes().unwrap()).unwrap();

        assert_eq!(value["type"], "authRequest");
        assert_eq!(value["params"]["chainId"], "eip155:1");
        assert_eq!(value["params"]["issuedAt"], "2024-05-01T12:00:00Z");
        // Optional fields are omitted, not null.
        assert!(value["params"].get("statement").is_none());
        assert!(value["params"].get("expirationTime").is_none());
    }

    #[test]
    fn test_response_wire_shapes() {
        let account: Account = "eip155:1:0xabc".parse().unwrap();

        let approved = WireMessage::AuthResponse {
            id: RequestId(1),
            payload: AuthResponsePayload::approved(account, CacaoSignature::eip191("00ff")),
        };
        let value: serde_json::Value =
            serde_json::from_slice(&approved.to_bytes().unwrap()).unwrap();
        assert_eq!(value["type"], "authResponse");
        assert_eq!(value["payload"]["approved"]["iss"], "eip155:1:0xabc");
        assert_eq!(value["payload"]["approved"]["signature"]["t"], "eip191");
        assert_eq!(value["payload"]["approved"]["signature"]["s"], "00ff");

        let rejected = WireMessage::AuthResponse {
            id: RequestId(1),
            payload: AuthResponsePayload::rejected(),
        };
        let value: serde_json::Value =
            serde_json::from_slice(&rejected.to_bytes().unwrap()).unwrap();
        assert_eq!(value["payload"]["rejected"], true);

        let error = WireMessage::AuthResponse {
            id: RequestId(1),
            payload: AuthResponsePayload::protocol_error("malformedRequest"),
        };
        let value: serde_json::Value = serde_json::from_slice(&error.to_bytes().unwrap()).unwrap();
        assert_eq!(value["payload"]["error"], "malformedRequest");
    }

    #[test]
    fn test_foreign_response_decodes() {
        // A response produced by another implementation, field order and all.
        let raw = br#"{"type":"authResponse","id":7,"payload":{"rejected":true}}"#;
        let message = WireMessage::from_bytes(raw).unwrap();
        assert_eq!(
            message,
            WireMessage::AuthResponse {
                id: RequestId(7),
                payload: AuthResponsePayload::rejected(),
            }
        );
    }

    // =========================================================================
    // DELIVERY EDGES
    // =========================================================================

    #[tokio::test]
    async fn test_duplicate_response_reports_once() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay);
        let mut outcomes = app.subscribe(EventFilter::all());

        let (id, _uri) = app.request(request_params("dup")).await.unwrap();
        let topic = app.topic().expect("request establishes a topic");

        // Give the engine's listener a beat to register.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let peer = relay.client();
        let response = WireMessage::AuthResponse {
            id,
            payload: AuthResponsePayload::rejected(),
        }
        .to_bytes()
        .unwrap();
        peer.publish(&topic, response.clone()).await.unwrap();
        peer.publish(&topic, response).await.unwrap();

        let event = timeout(Duration::from_secs(2), outcomes.recv())
            .await
            .expect("timed out")
            .expect("bus closed");
        assert_eq!(
            event,
            AuthEvent::ResponseOutcome {
                id,
                outcome: VerificationOutcome::Failure(AuthFailure::UserRejected),
            }
        );

        // The duplicate is dropped, not re-reported.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(matches!(outcomes.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_garbage_payload_does_not_wedge_the_listener() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay);
        let mut outcomes = app.subscribe(EventFilter::all());

        let (id, _uri) = app.request(request_params("noise")).await.unwrap();
        let topic = app.topic().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let peer = relay.client();
        peer.publish(&topic, b"not json at all".to_vec()).await.unwrap();

        // A real response after the noise still lands.
        let response = WireMessage::AuthResponse {
            id,
            payload: AuthResponsePayload::rejected(),
        }
        .to_bytes()
        .unwrap();
        peer.publish(&topic, response).await.unwrap();

        let event = timeout(Duration::from_secs(2), outcomes.recv())
            .await
            .expect("timed out")
            .expect("bus closed");
        assert_eq!(event.request_id(), id);
    }

    #[tokio::test]
    async fn test_malformed_incoming_request_declined_on_the_wire() {
        use signon_engine::PairingUri;

        let relay = InMemoryRelay::new();
        let account: Account = "eip155:1:0x724d0D2DaD3fbB0C168f947B87Fa5DBe36F1A8bf"
            .parse()
            .unwrap();
        let wallet = AuthEngine::new(
            Arc::new(relay.client()),
            Arc::new(InMemoryPairing::new()),
            Arc::new(InMemoryStorage::new()),
            EngineConfig::responder(account),
        );
        let mut requests = wallet.subscribe(EventFilter::all());

        wallet
            .pair(&PairingUri("signon:malformed-topic@1".to_string()))
            .await
            .unwrap();
        let topic = wallet.topic().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let peer = relay.client();
        let mut peer_rx = peer.subscribe(&topic).await.unwrap();

        // Empty nonce fails validation on the wallet side.
        let bad = request_params("");
        let request = WireMessage::AuthRequest {
            id: RequestId(9),
            params: bad,
        }
        .to_bytes()
        .unwrap();
        peer.publish(&topic, request).await.unwrap();

        // The decline comes back over the wire, not through an app event.
        let reply = timeout(Duration::from_secs(2), peer_rx.recv())
            .await
            .expect("timed out")
            .expect("relay closed");
        let message = WireMessage::from_bytes(&reply).unwrap();
        assert_eq!(
            message,
            WireMessage::AuthResponse {
                id: RequestId(9),
                payload: AuthResponsePayload::protocol_error("malformedRequest"),
            }
        );
        assert!(matches!(requests.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_response_for_unknown_id_is_ignored() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay);
        let mut outcomes = app.subscribe(EventFilter::all());

        let (_id, _uri) = app.request(request_params("other")).await.unwrap();
        let topic = app.topic().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let peer = relay.client();
        let response = WireMessage::AuthResponse {
            id: RequestId(0x5151_5151),
            payload: AuthResponsePayload::rejected(),
        }
        .to_bytes()
        .unwrap();
        peer.publish(&topic, response).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(matches!(outcomes.try_recv(), Ok(None)));
    }
}
