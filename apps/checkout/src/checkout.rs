//! # Submission Dispatcher
//!
//! Runs the two submission channels of the ordering page against the cart.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Submission States                                    │
//! │                                                                         │
//! │   place_order() while signed out                                        │
//! │   ┌──────────┐ ───────────────────────────────────► ┌──────────────┐   │
//! │   │   Idle   │                                      │ AwaitingAuth │   │
//! │   └──────────┘ ◄─────────────────────────────────── └──────────────┘   │
//! │     │   ▲ ▲          dismiss_auth_prompt()                              │
//! │     │   │ │                                                             │
//! │     │   │ └──────── next request ─────────┐                             │
//! │     │   │                                 │                             │
//! │     │   │  remote failure          ┌──────┴──────┐                      │
//! │     │   └─────── Failed ◄───────── │ Submitting  │ ──► Succeeded        │
//! │     │          (observed, then     └─────────────┘     { order_id }     │
//! │     │           straight to Idle)         ▲            cart cleared     │
//! │     │                                     │                             │
//! │     └─── signed in, cart non-empty, ──────┘                             │
//! │          checkout guard passed                                          │
//! │                                                                         │
//! │   order_via_whatsapp(): guard → compose → wa.me link → LinkOpener      │
//! │   Never enters Submitting and never touches the cart.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Idle → Submitting` check-and-set happens under one lock, so at most
//! one API submission is in flight. No lock is held across the remote call.
//!
//! The cart itself is not locked while submitting. A successful submission
//! empties the whole cart, including lines added after the payload was
//! built; the page disables cart edits while `is_submitting()` is true.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use bistro_core::validation::validate_checkout;
use bistro_core::{
    build_payload, compose_message, CurrencyFormat, DeliveryFeePolicy, OrderPayload,
};

use crate::api::OrderApi;
use crate::error::{CheckoutError, CheckoutResult};
use crate::state::{CartState, CheckoutConfig, IdentityProvider};
use crate::whatsapp::{whatsapp_link, LinkOpener};

/// Capacity of the transition broadcast; slow subscribers see `Lagged`.
const TRANSITION_CHANNEL_CAPACITY: usize = 32;

// =============================================================================
// States and Outcomes
// =============================================================================

/// Where the dispatcher is in the submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SubmissionState {
    Idle,
    /// The page should show its sign-in prompt.
    AwaitingAuth,
    /// An API submission is waiting for the backend.
    #[serde(rename_all = "camelCase")]
    Submitting { attempt_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Succeeded { order_id: String },
    /// Transient; the dispatcher moves on to `Idle` right after.
    Failed { message: String },
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting { .. })
    }
}

/// Result of a submission request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmissionOutcome {
    /// Not signed in; the dispatcher is now `AwaitingAuth`.
    AuthRequired,
    /// The cart was empty; nothing happened.
    NothingToSubmit,
    /// The backend accepted the order and the cart was cleared.
    #[serde(rename_all = "camelCase")]
    Placed { order_id: String },
    /// The WhatsApp link was handed to the link opener.
    LinkOpened { url: String },
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Orchestrates the auth gate, the checkout guard and the two channels.
pub struct Dispatcher {
    cart: Arc<CartState>,
    identity: Arc<dyn IdentityProvider>,
    api: Arc<dyn OrderApi>,
    links: Arc<dyn LinkOpener>,
    fee_policy: Arc<dyn DeliveryFeePolicy>,
    formatter: CurrencyFormat,
    whatsapp_number: String,
    state: Mutex<SubmissionState>,
    transitions: broadcast::Sender<SubmissionState>,
}

impl Dispatcher {
    /// Creates an idle dispatcher. Fee, currency and WhatsApp number come
    /// from `config`.
    pub fn new(
        cart: Arc<CartState>,
        identity: Arc<dyn IdentityProvider>,
        api: Arc<dyn OrderApi>,
        links: Arc<dyn LinkOpener>,
        config: &CheckoutConfig,
    ) -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);

        Dispatcher {
            cart,
            identity,
            api,
            links,
            fee_policy: Arc::new(config.delivery_fee()),
            formatter: config.currency_format(),
            whatsapp_number: config.restaurant.whatsapp_number.clone(),
            state: Mutex::new(SubmissionState::Idle),
            transitions,
        }
    }

    /// Replaces the delivery fee policy.
    pub fn with_fee_policy(mut self, policy: Arc<dyn DeliveryFeePolicy>) -> Self {
        self.fee_policy = policy;
        self
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        self.lock_state().clone()
    }

    /// The page's `loading` flag.
    pub fn is_submitting(&self) -> bool {
        self.lock_state().is_submitting()
    }

    /// Receives every state transition, including the transient `Failed`.
    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionState> {
        self.transitions.subscribe()
    }

    /// API channel.
    ///
    /// ## Steps
    /// 1. Signed out → `AwaitingAuth`, [`SubmissionOutcome::AuthRequired`]
    /// 2. Empty cart → no-op, [`SubmissionOutcome::NothingToSubmit`]
    /// 3. Checkout guard → [`CheckoutError::Validation`], nothing sent
    /// 4. `Submitting`, remote call with a fresh attempt id
    /// 5. Success → cart cleared, `Succeeded`, [`SubmissionOutcome::Placed`]
    /// 6. Failure → `Failed` then `Idle`, cart intact, generic
    ///    [`CheckoutError::SubmissionFailed`]
    pub async fn place_order(&self, special_instructions: &str) -> CheckoutResult<SubmissionOutcome> {
        let (attempt_id, payload) = {
            let mut state = self.lock_state();
            self.begin_request(&mut state)?;

            if !self.identity.is_authenticated() {
                info!("Sign-in required before placing an order");
                self.transition(&mut state, SubmissionState::AwaitingAuth);
                return Ok(SubmissionOutcome::AuthRequired);
            }
            self.transition(&mut state, SubmissionState::Idle);
            let identity = self.identity.identity();

            let prepared = self.cart.with_cart(|cart| -> CheckoutResult<Option<OrderPayload>> {
                if cart.is_empty() {
                    return Ok(None);
                }
                let draft = cart.draft(identity.as_ref(), special_instructions);
                validate_checkout(&draft).inspect_err(|e| {
                    warn!(field = e.field(), error = %e, "Order blocked by checkout guard");
                })?;
                let breakdown = cart.quote(self.fee_policy.as_ref());
                Ok(Some(build_payload(&draft, &breakdown)))
            })?;

            let Some(payload) = prepared else {
                debug!("place_order with empty cart ignored");
                return Ok(SubmissionOutcome::NothingToSubmit);
            };

            let attempt_id = Uuid::new_v4();
            self.transition(&mut state, SubmissionState::Submitting { attempt_id });
            (attempt_id, payload)
        };

        let span = info_span!("submit_order", %attempt_id, user_id = ?payload.user_id);
        let result = self
            .api
            .submit_order(attempt_id, &payload)
            .instrument(span)
            .await;

        let mut state = self.lock_state();
        match result {
            Ok(receipt) => {
                // Whole cart, not just the submitted lines.
                self.cart.with_cart_mut(|cart| cart.clear());
                info!(%attempt_id, order_id = %receipt.order_id, "Order placed");
                self.transition(
                    &mut state,
                    SubmissionState::Succeeded {
                        order_id: receipt.order_id.clone(),
                    },
                );
                Ok(SubmissionOutcome::Placed {
                    order_id: receipt.order_id,
                })
            }
            Err(err) => {
                error!(%attempt_id, error = %err, "Order submission failed");
                let failure = CheckoutError::submission_failed();
                self.transition(
                    &mut state,
                    SubmissionState::Failed {
                        message: failure.to_string(),
                    },
                );
                self.transition(&mut state, SubmissionState::Idle);
                Err(failure)
            }
        }
    }

    /// WhatsApp channel. Does not require sign-in; the identity is used for
    /// the name and email when present.
    pub fn order_via_whatsapp(&self, special_instructions: &str) -> CheckoutResult<SubmissionOutcome> {
        {
            let mut state = self.lock_state();
            self.begin_request(&mut state)?;
        }

        let identity = self.identity.identity();
        let message = self.cart.with_cart(|cart| -> CheckoutResult<Option<String>> {
            if cart.is_empty() {
                return Ok(None);
            }
            let draft = cart.draft(identity.as_ref(), special_instructions);
            validate_checkout(&draft).inspect_err(|e| {
                warn!(field = e.field(), error = %e, "WhatsApp order blocked by checkout guard");
            })?;
            let breakdown = cart.quote(self.fee_policy.as_ref());
            Ok(Some(compose_message(&draft, &breakdown, &self.formatter)))
        })?;

        let Some(message) = message else {
            debug!("order_via_whatsapp with empty cart ignored");
            return Ok(SubmissionOutcome::NothingToSubmit);
        };

        let url = whatsapp_link(&self.whatsapp_number, &message);
        self.links.open(&url).map_err(|e| {
            error!(error = %e, "Could not open WhatsApp link");
            CheckoutError::LinkOpen(e.to_string())
        })?;
        info!(chars = message.chars().count(), "WhatsApp order link opened");

        Ok(SubmissionOutcome::LinkOpened { url })
    }

    /// Closes the sign-in prompt: `AwaitingAuth → Idle`. Other states are
    /// left alone. Returns the state afterwards.
    pub fn dismiss_auth_prompt(&self) -> SubmissionState {
        let mut state = self.lock_state();
        if *state == SubmissionState::AwaitingAuth {
            self.transition(&mut state, SubmissionState::Idle);
        }
        state.clone()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Rejects while submitting; a finished attempt starts over from `Idle`.
    fn begin_request(&self, state: &mut SubmissionState) -> CheckoutResult<()> {
        match state {
            SubmissionState::Submitting { attempt_id } => {
                warn!(%attempt_id, "Submission already in flight");
                Err(CheckoutError::SubmissionInFlight)
            }
            SubmissionState::Succeeded { .. } | SubmissionState::Failed { .. } => {
                self.transition(state, SubmissionState::Idle);
                Ok(())
            }
            SubmissionState::Idle | SubmissionState::AwaitingAuth => Ok(()),
        }
    }

    fn transition(&self, state: &mut SubmissionState, next: SubmissionState) {
        if *state == next {
            return;
        }
        debug!(from = ?state, to = ?next, "Submission state change");
        *state = next.clone();
        // No subscribers is fine.
        let _ = self.transitions.send(next);
    }

    fn lock_state(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state())
            .field("whatsapp_number", &self.whatsapp_number)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::OrderReceipt;
    use crate::error::{ClientError, ClientResult, GENERIC_SUBMISSION_FAILURE};
    use crate::state::SessionState;
    use async_trait::async_trait;
    use bistro_core::{
        CustomerInfoPatch, Identity, MenuItem, Money, OrderType, ValidationError,
    };
    use tokio::sync::Notify;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    enum Reply {
        Accept(&'static str),
        Reject,
    }

    struct FakeOrderApi {
        reply: Reply,
        gate: Option<Arc<Notify>>,
        calls: Mutex<Vec<(Uuid, OrderPayload)>>,
    }

    impl FakeOrderApi {
        fn accepting(order_id: &'static str) -> Arc<Self> {
            Arc::new(FakeOrderApi {
                reply: Reply::Accept(order_id),
                gate: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn rejecting() -> Arc<Self> {
            Arc::new(FakeOrderApi {
                reply: Reply::Reject,
                gate: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn gated(order_id: &'static str, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(FakeOrderApi {
                reply: Reply::Accept(order_id),
                gate: Some(gate),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(Uuid, OrderPayload)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderApi for FakeOrderApi {
        async fn submit_order(
            &self,
            attempt_id: Uuid,
            payload: &OrderPayload,
        ) -> ClientResult<OrderReceipt> {
            self.calls.lock().unwrap().push((attempt_id, payload.clone()));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.reply {
                Reply::Accept(order_id) => Ok(OrderReceipt {
                    order_id: order_id.to_string(),
                }),
                Reply::Reject => Err(ClientError::Rejected {
                    status: 503,
                    body: "kitchen closed".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&self, url: &str) -> std::io::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    struct BrokenOpener;

    impl LinkOpener for BrokenOpener {
        fn open(&self, _url: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no browser available",
            ))
        }
    }

    struct Harness {
        cart: Arc<CartState>,
        session: Arc<SessionState>,
        api: Arc<FakeOrderApi>,
        opener: Arc<RecordingOpener>,
        dispatcher: Arc<Dispatcher>,
    }

    fn harness(api: Arc<FakeOrderApi>) -> Harness {
        let cart = Arc::new(CartState::new());
        let session = Arc::new(SessionState::new());
        let opener = Arc::new(RecordingOpener::default());
        let dispatcher = Arc::new(Dispatcher::new(
            cart.clone(),
            session.clone(),
            api.clone(),
            opener.clone(),
            &CheckoutConfig::default(),
        ));
        Harness {
            cart,
            session,
            api,
            opener,
            dispatcher,
        }
    }

    fn burger() -> MenuItem {
        MenuItem {
            id: 1,
            name: "Burger".to_string(),
            price_cents: 500,
            description: None,
            image_url: None,
        }
    }

    /// Burger x2, ready for delivery, signed in.
    fn ready_for_delivery(h: &Harness) {
        h.session.sign_in(Identity::new("u-1").with_name("Asha"));
        h.cart.with_cart_mut(|c| {
            c.add_item(&burger(), 2, None).unwrap();
            c.set_customer_info(CustomerInfoPatch {
                phone: Some("+15550100".to_string()),
                delivery_address: Some("12 Harbour Road".to_string()),
                ..Default::default()
            });
        });
    }

    fn drain(rx: &mut broadcast::Receiver<SubmissionState>) -> Vec<SubmissionState> {
        let mut seen = Vec::new();
        while let Ok(state) = rx.try_recv() {
            seen.push(state);
        }
        seen
    }

    // -------------------------------------------------------------------------
    // API channel
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_place_order_success_clears_cart() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        ready_for_delivery(&h);
        let mut rx = h.dispatcher.subscribe();

        let outcome = h.dispatcher.place_order("Ring twice").await.unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Placed {
                order_id: "ord_1".to_string()
            }
        );
        assert!(h.cart.with_cart(|c| c.is_empty()));
        assert_eq!(
            h.dispatcher.state(),
            SubmissionState::Succeeded {
                order_id: "ord_1".to_string()
            }
        );

        let calls = h.api.calls();
        assert_eq!(calls.len(), 1);
        let payload = &calls[0].1;
        assert_eq!(payload.customer_name, "Asha");
        assert_eq!(payload.user_id.as_deref(), Some("u-1"));
        assert_eq!(payload.subtotal_cents, 1000);
        assert_eq!(payload.delivery_fee_cents, 399);
        assert_eq!(payload.total_cents, 1399);
        assert_eq!(payload.special_instructions.as_deref(), Some("Ring twice"));

        let seen = drain(&mut rx);
        assert!(matches!(seen[0], SubmissionState::Submitting { attempt_id } if attempt_id == calls[0].0));
        assert!(matches!(seen[1], SubmissionState::Succeeded { .. }));
    }

    #[tokio::test]
    async fn test_place_order_signed_out_awaits_auth() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        ready_for_delivery(&h);
        h.session.sign_out();

        let outcome = h.dispatcher.place_order("").await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::AuthRequired);
        assert_eq!(h.dispatcher.state(), SubmissionState::AwaitingAuth);
        assert!(h.api.calls().is_empty());

        assert_eq!(h.dispatcher.dismiss_auth_prompt(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_auth_gate_uses_provider_predicate() {
        struct TokenSession {
            authenticated: bool,
            identity: Option<Identity>,
        }

        impl IdentityProvider for TokenSession {
            fn is_authenticated(&self) -> bool {
                self.authenticated
            }

            fn identity(&self) -> Option<Identity> {
                self.identity.clone()
            }
        }

        let dispatcher_for = |session: TokenSession, api: Arc<FakeOrderApi>| {
            let cart = Arc::new(CartState::new());
            cart.with_cart_mut(|c| {
                c.add_item(&burger(), 1, None).unwrap();
                c.set_order_type(OrderType::Takeaway);
                c.set_customer_info(CustomerInfoPatch {
                    name: Some("Asha".to_string()),
                    phone: Some("+15550100".to_string()),
                    ..Default::default()
                });
            });
            Dispatcher::new(
                cart,
                Arc::new(session),
                api,
                Arc::new(RecordingOpener::default()),
                &CheckoutConfig::default(),
            )
        };

        // Expired session: profile still cached, but not authenticated.
        let api = FakeOrderApi::accepting("ord_1");
        let expired = dispatcher_for(
            TokenSession {
                authenticated: false,
                identity: Some(Identity::new("u-1").with_name("Asha")),
            },
            api.clone(),
        );
        assert_eq!(
            expired.place_order("").await.unwrap(),
            SubmissionOutcome::AuthRequired
        );
        assert!(api.calls().is_empty());

        // Authenticated before the profile loaded: typed name is used.
        let api = FakeOrderApi::accepting("ord_2");
        let fresh = dispatcher_for(
            TokenSession {
                authenticated: true,
                identity: None,
            },
            api.clone(),
        );
        assert_eq!(
            fresh.place_order("").await.unwrap(),
            SubmissionOutcome::Placed {
                order_id: "ord_2".to_string()
            }
        );
        let (_, payload) = api.calls().remove(0);
        assert_eq!(payload.customer_name, "Asha");
        assert_eq!(payload.user_id, None);
    }

    #[tokio::test]
    async fn test_auth_checked_before_empty_cart() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        let outcome = h.dispatcher.place_order("").await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::AuthRequired);
    }

    #[tokio::test]
    async fn test_retry_after_sign_in() {
        let h = harness(FakeOrderApi::accepting("ord_7"));
        ready_for_delivery(&h);
        let identity = h.session.identity().unwrap();
        h.session.sign_out();

        h.dispatcher.place_order("").await.unwrap();
        assert_eq!(h.dispatcher.state(), SubmissionState::AwaitingAuth);

        h.session.sign_in(identity);
        let outcome = h.dispatcher.place_order("").await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Placed { .. }));
    }

    #[tokio::test]
    async fn test_empty_cart_is_noop() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        h.session.sign_in(Identity::new("u-1").with_name("Asha"));
        let mut rx = h.dispatcher.subscribe();

        let outcome = h.dispatcher.place_order("").await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::NothingToSubmit);
        assert_eq!(h.dispatcher.state(), SubmissionState::Idle);
        assert!(h.api.calls().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_missing_phone_blocks_without_remote_call() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        ready_for_delivery(&h);
        h.cart.with_cart_mut(|c| {
            c.set_customer_info(CustomerInfoPatch {
                phone: Some(String::new()),
                ..Default::default()
            })
        });

        let err = h.dispatcher.place_order("").await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::Required { ref field }) if field == "phone"
        ));
        assert!(h.api.calls().is_empty());
        assert_eq!(h.dispatcher.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_delivery_without_address_blocks() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        ready_for_delivery(&h);
        h.cart.with_cart_mut(|c| {
            c.set_customer_info(CustomerInfoPatch {
                delivery_address: Some("  ".to_string()),
                ..Default::default()
            })
        });

        assert!(matches!(
            h.dispatcher.place_order("").await,
            Err(CheckoutError::Validation(_))
        ));

        // Same cart is fine for takeaway.
        h.cart.with_cart_mut(|c| c.set_order_type(OrderType::Takeaway));
        assert!(h.dispatcher.place_order("").await.is_ok());
    }

    #[tokio::test]
    async fn test_remote_failure_returns_to_idle_with_cart_intact() {
        let h = harness(FakeOrderApi::rejecting());
        ready_for_delivery(&h);
        let before = h.cart.with_cart(|c| c.items.clone());
        let mut rx = h.dispatcher.subscribe();

        let err = h.dispatcher.place_order("").await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_SUBMISSION_FAILURE);
        assert_eq!(h.dispatcher.state(), SubmissionState::Idle);
        assert_eq!(h.cart.with_cart(|c| c.items.clone()), before);

        let seen = drain(&mut rx);
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_submitting());
        assert_eq!(
            seen[1],
            SubmissionState::Failed {
                message: GENERIC_SUBMISSION_FAILURE.to_string()
            }
        );
        assert_eq!(seen[2], SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_each_attempt_gets_a_new_id() {
        let h = harness(FakeOrderApi::rejecting());
        ready_for_delivery(&h);

        let _ = h.dispatcher.place_order("").await;
        let _ = h.dispatcher.place_order("").await;

        let calls = h.api.calls();
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].0, calls[1].0);
    }

    #[tokio::test]
    async fn test_second_request_while_submitting_is_rejected() {
        let gate = Arc::new(Notify::new());
        let h = harness(FakeOrderApi::gated("ord_9", gate.clone()));
        ready_for_delivery(&h);

        let dispatcher = h.dispatcher.clone();
        let first = tokio::spawn(async move { dispatcher.place_order("").await });

        while !h.dispatcher.is_submitting() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            h.dispatcher.place_order("").await,
            Err(CheckoutError::SubmissionInFlight)
        ));
        assert!(matches!(
            h.dispatcher.order_via_whatsapp(""),
            Err(CheckoutError::SubmissionInFlight)
        ));

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Placed { .. }));
        assert_eq!(h.api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_success_clears_lines_added_while_submitting() {
        let gate = Arc::new(Notify::new());
        let h = harness(FakeOrderApi::gated("ord_9", gate.clone()));
        ready_for_delivery(&h);

        let dispatcher = h.dispatcher.clone();
        let first = tokio::spawn(async move { dispatcher.place_order("").await });
        while !h.dispatcher.is_submitting() {
            tokio::task::yield_now().await;
        }

        let soup = MenuItem {
            id: 2,
            name: "Soup".to_string(),
            price_cents: 450,
            description: None,
            image_url: None,
        };
        h.cart.with_cart_mut(|c| c.add_item(&soup, 1, None).unwrap());

        gate.notify_one();
        first.await.unwrap().unwrap();

        let (_, payload) = h.api.calls().remove(0);
        assert_eq!(payload.items.len(), 1);
        assert!(h.cart.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_new_request_after_success_starts_from_idle() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        ready_for_delivery(&h);
        h.dispatcher.place_order("").await.unwrap();

        let mut rx = h.dispatcher.subscribe();
        let outcome = h.dispatcher.place_order("").await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::NothingToSubmit);
        assert_eq!(drain(&mut rx), vec![SubmissionState::Idle]);
    }

    // -------------------------------------------------------------------------
    // WhatsApp channel
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_whatsapp_dine_in_link() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        h.cart.with_cart_mut(|c| {
            c.add_item(&burger(), 2, None).unwrap();
            c.set_order_type(OrderType::DineIn);
            c.set_customer_info(CustomerInfoPatch {
                name: Some("Asha".to_string()),
                phone: Some("+15550100".to_string()),
                table_number: Some(7),
                ..Default::default()
            });
        });

        let outcome = h.dispatcher.order_via_whatsapp("").unwrap();
        let SubmissionOutcome::LinkOpened { url } = outcome else {
            panic!("expected a WhatsApp link");
        };

        assert!(url.starts_with("https://wa.me/917012975494?text="));
        assert!(url.contains("Table%20Number%3A%207"));
        assert!(!url.contains("Delivery%20Address"));
        assert!(!url.contains("Delivery%20Fee"));
        assert_eq!(h.opener.opened.lock().unwrap().as_slice(), &[url.clone()]);

        // No sign-in needed, no state change, cart untouched.
        assert_eq!(h.dispatcher.state(), SubmissionState::Idle);
        assert_eq!(h.cart.with_cart(|c| c.item_count()), 1);
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_whatsapp_empty_cart_is_noop() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        assert_eq!(
            h.dispatcher.order_via_whatsapp("").unwrap(),
            SubmissionOutcome::NothingToSubmit
        );
        assert!(h.opener.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whatsapp_runs_same_guard() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        h.cart.with_cart_mut(|c| c.add_item(&burger(), 1, None).unwrap());

        assert!(matches!(
            h.dispatcher.order_via_whatsapp(""),
            Err(CheckoutError::Validation(_))
        ));
        assert!(h.opener.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whatsapp_opener_failure_is_reported() {
        let h = harness(FakeOrderApi::accepting("ord_1"));
        ready_for_delivery(&h);
        let dispatcher = Dispatcher::new(
            h.cart.clone(),
            h.session.clone(),
            h.api.clone(),
            Arc::new(BrokenOpener),
            &CheckoutConfig::default(),
        );

        let err = dispatcher.order_via_whatsapp("").unwrap_err();
        assert!(matches!(&err, CheckoutError::LinkOpen(reason) if reason == "no browser available"));
        assert_eq!(dispatcher.state(), SubmissionState::Idle);
        assert_eq!(h.cart.with_cart(|c| c.item_count()), 1);
    }

    #[tokio::test]
    async fn test_custom_fee_policy() {
        struct NoFee;
        impl DeliveryFeePolicy for NoFee {
            fn fee_for(&self, _order_type: OrderType, _subtotal: Money) -> Money {
                Money::zero()
            }
        }

        let api = FakeOrderApi::accepting("ord_1");
        let cart = Arc::new(CartState::new());
        let session = Arc::new(SessionState::signed_in(Identity::new("u-1").with_name("Asha")));
        let dispatcher = Dispatcher::new(
            cart.clone(),
            session,
            api.clone(),
            Arc::new(RecordingOpener::default()),
            &CheckoutConfig::default(),
        )
        .with_fee_policy(Arc::new(NoFee));

        cart.with_cart_mut(|c| {
            c.add_item(&burger(), 2, None).unwrap();
            c.set_customer_info(CustomerInfoPatch {
                phone: Some("+15550100".to_string()),
                delivery_address: Some("12 Harbour Road".to_string()),
                ..Default::default()
            });
        });

        dispatcher.place_order("").await.unwrap();
        assert_eq!(api.calls()[0].1.total_cents, 1000);
    }
}
