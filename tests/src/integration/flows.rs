//! # End-to-End Auth Exchange Flows
//!
//! A requesting application and a wallet, each running its own engine,
//! exchange sign-in requests over the in-memory relay:
//!
//! 1. **Approval**: request → pair → sign → verified `Success`
//! 2. **Rejection**: request → pair → decline → `UserRejected`
//! 3. **Bad signature**: a signature by the wrong key → `SignatureVerificationFailed`
//! 4. **Expiry**: no responder → `Expired` after the deadline
//! 5. **Cancel**: a cancelled request never reports an outcome

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use signon_bus::{AuthEvent, EventFilter};
    use signon_crypto::sign_message;
    use signon_engine::{
        AuthEngine, AuthProtocolApi, EngineConfig, InMemoryPairing, InMemoryRelay, InMemoryStorage,
    };
    use signon_message::render_message;
    use signon_types::{
        Account, AuthFailure, AuthRequestParams, CacaoSignature, VerificationOutcome,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Reference exchange key pair (raw secp256k1 scalar and its account).
    const PRIVATE_KEY: &str = "462c1dad6832d7d96ccf87bd6a686a4110e114aaaebd5512e552c0e3a87b480f";
    const ACCOUNT: &str = "eip155:1:0x724d0D2DaD3fbB0C168f947B87Fa5DBe36F1A8bf";

    /// A well-formed 65-byte signature that was not produced over any of
    /// these messages; recovery yields the wrong address.
    const UNRELATED_SIGNATURE: &str = "438effc459956b57fcd9f3dac6c675f9cee88abf21acab7305e8e32aa0303a883b06dcbd956279a7a2ca21ffa882ff55cc22e8ab8ec0f3fe90ab45f306938cfa1b";

    fn request_params() -> AuthRequestParams {
        use rand::Rng;
        let nonce: String = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        AuthRequestParams {
            chain_id: "eip155:1".to_string(),
            domain: "app.example.com".to_string(),
            aud: "https://app.example.com/login".to_string(),
            statement: Some("Sign in with your wallet".to_string()),
            nonce,
            issued_at: "2024-05-01T12:00:00Z".to_string(),
            expiration_time: None,
            not_before: None,
            request_id: None,
            resources: vec![],
        }
    }

    fn app_engine(relay: &InMemoryRelay, timeout: Duration) -> AuthEngine {
        crate::init_tracing();
        AuthEngine::new(
            Arc::new(relay.client()),
            Arc::new(InMemoryPairing::new()),
            Arc::new(InMemoryStorage::new()),
            EngineConfig::default().with_response_timeout(timeout),
        )
    }

    fn wallet_engine(relay: &InMemoryRelay) -> AuthEngine {
        let account: Account = ACCOUNT.parse().expect("fixture account");
        AuthEngine::new(
            Arc::new(relay.client()),
            Arc::new(InMemoryPairing::new()),
            Arc::new(InMemoryStorage::new()),
            EngineConfig::responder(account),
        )
    }

    async fn next_event(sub: &mut signon_bus::Subscription) -> AuthEvent {
        timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed")
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_full_approval_flow() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay, Duration::from_secs(5));
        let wallet = wallet_engine(&relay);

        let mut outcomes = app.subscribe(EventFilter::all());
        let mut requests = wallet.subscribe(EventFilter::all());

        let params = request_params();
        let (id, uri) = app.request(params.clone()).await.unwrap();
        wallet.pair(&uri.expect("first request mints a pairing")).await.unwrap();

        // The wallet sees the request with the exact message its user will
        // be asked to sign.
        let AuthEvent::IncomingRequest {
            id: incoming,
            message,
            params: received,
        } = next_event(&mut requests).await
        else {
            panic!("expected an incoming request");
        };
        assert_eq!(incoming, id);
        assert_eq!(received, params);
        let account: Account = ACCOUNT.parse().unwrap();
        assert_eq!(message, render_message(&params, account.address()));

        // Sign out-of-engine and hand the signature back.
        let key = hex::decode(PRIVATE_KEY).unwrap();
        let signature = sign_message(&message, &key).unwrap();
        wallet.respond(id, signature).await.unwrap();

        let AuthEvent::ResponseOutcome { id: done, outcome } = next_event(&mut outcomes).await
        else {
            panic!("expected an outcome");
        };
        assert_eq!(done, id);
        assert_eq!(outcome, VerificationOutcome::Success(account));
    }

    #[tokio::test]
    async fn test_one_step_approve_flow() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay, Duration::from_secs(5));
        let wallet = wallet_engine(&relay);

        let mut outcomes = app.subscribe(EventFilter::all());
        let mut requests = wallet.subscribe(EventFilter::all());

        let (id, uri) = app.request(request_params()).await.unwrap();
        wallet.pair(&uri.unwrap()).await.unwrap();
        next_event(&mut requests).await;

        let key = hex::decode(PRIVATE_KEY).unwrap();
        wallet.approve(id, &key).await.unwrap();

        let AuthEvent::ResponseOutcome { outcome, .. } = next_event(&mut outcomes).await else {
            panic!("expected an outcome");
        };
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_rejection_flow() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay, Duration::from_secs(5));
        let wallet = wallet_engine(&relay);

        let mut outcomes = app.subscribe(EventFilter::all());
        let mut requests = wallet.subscribe(EventFilter::all());

        let (id, uri) = app.request(request_params()).await.unwrap();
        wallet.pair(&uri.unwrap()).await.unwrap();
        next_event(&mut requests).await;

        wallet.reject(id).await.unwrap();

        let AuthEvent::ResponseOutcome { id: done, outcome } = next_event(&mut outcomes).await
        else {
            panic!("expected an outcome");
        };
        assert_eq!(done, id);
        assert_eq!(
            outcome,
            VerificationOutcome::Failure(AuthFailure::UserRejected)
        );
    }

    #[tokio::test]
    async fn test_unrelated_signature_fails_verification() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay, Duration::from_secs(5));
        let wallet = wallet_engine(&relay);

        let mut outcomes = app.subscribe(EventFilter::all());
        let mut requests = wallet.subscribe(EventFilter::all());

        let (id, uri) = app.request(request_params()).await.unwrap();
        wallet.pair(&uri.unwrap()).await.unwrap();
        next_event(&mut requests).await;

        // Well-formed signature, wrong message: recovery produces an
        // address that does not match the claimed account.
        wallet
            .respond(id, CacaoSignature::eip191(UNRELATED_SIGNATURE))
            .await
            .unwrap();

        let AuthEvent::ResponseOutcome { outcome, .. } = next_event(&mut outcomes).await else {
            panic!("expected an outcome");
        };
        assert_eq!(
            outcome,
            VerificationOutcome::Failure(AuthFailure::SignatureVerificationFailed)
        );
    }

    #[tokio::test]
    async fn test_no_response_expires() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay, Duration::from_millis(150));

        let mut outcomes = app.subscribe(EventFilter::all());

        let (id, _uri) = app.request(request_params()).await.unwrap();

        let AuthEvent::ResponseOutcome { id: done, outcome } = next_event(&mut outcomes).await
        else {
            panic!("expected an outcome");
        };
        assert_eq!(done, id);
        assert_eq!(outcome, VerificationOutcome::Failure(AuthFailure::Expired));
    }

    #[tokio::test]
    async fn test_cancelled_request_reports_nothing() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay, Duration::from_millis(200));
        let wallet = wallet_engine(&relay);

        let mut outcomes = app.subscribe(EventFilter::all());
        let mut requests = wallet.subscribe(EventFilter::all());

        let (id, uri) = app.request(request_params()).await.unwrap();
        wallet.pair(&uri.unwrap()).await.unwrap();
        next_event(&mut requests).await;

        app.cancel(id).await.unwrap();

        // The wallet's late approval is silently dropped, and the deadline
        // finds nothing to expire.
        let key = hex::decode(PRIVATE_KEY).unwrap();
        wallet.approve(id, &key).await.unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(matches!(outcomes.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_pairing_is_reused_across_requests() {
        let relay = InMemoryRelay::new();
        let app = app_engine(&relay, Duration::from_secs(5));
        let wallet = wallet_engine(&relay);

        let mut outcomes = app.subscribe(EventFilter::all());
        let mut requests = wallet.subscribe(EventFilter::all());

        let (first, uri) = app.request(request_params()).await.unwrap();
        assert!(uri.is_some());
        wallet.pair(&uri.unwrap()).await.unwrap();

        let (second, uri) = app.request(request_params()).await.unwrap();
        assert!(uri.is_none());
        assert_ne!(first, second);

        let key = hex::decode(PRIVATE_KEY).unwrap();
        for _ in 0..2 {
            let AuthEvent::IncomingRequest { id, .. } = next_event(&mut requests).await else {
                panic!("expected an incoming request");
            };
            wallet.approve(id, &key).await.unwrap();
        }

        let mut completed = vec![
            next_event(&mut outcomes).await.request_id(),
            next_event(&mut outcomes).await.request_id(),
        ];
        completed.sort_unstable();
        let mut expected = vec![first, second];
        expected.sort_unstable();
        assert_eq!(completed, expected);
    }
}
