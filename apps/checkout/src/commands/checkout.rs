//! # Checkout Commands
//!
//! The "Place Order" and "Order via WhatsApp" buttons, plus the sign-in
//! prompt's close button.
//!
//! ```text
//! Place Order ──► place_order() ──► Dispatcher::place_order()
//!                                        │
//!                    ┌───────────────────┼────────────────────┐
//!                    ▼                   ▼                    ▼
//!              AuthRequired        Placed{order_id}      ApiError
//!              (show sign-in)      notice shown          message shown
//! ```

use serde::Serialize;
use tracing::debug;

use crate::checkout::{Dispatcher, SubmissionOutcome, SubmissionState};
use crate::error::ApiError;

/// What the page needs after a checkout button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
    /// Text for the confirmation banner, when there is one.
    pub notice: Option<String>,
    pub state: SubmissionState,
}

impl CheckoutResponse {
    fn new(outcome: SubmissionOutcome, state: SubmissionState) -> Self {
        let notice = match &outcome {
            SubmissionOutcome::Placed { order_id } => {
                Some(format!("Order placed successfully! Order ID: {}", order_id))
            }
            SubmissionOutcome::AuthRequired => Some("Please sign in to place your order.".to_string()),
            SubmissionOutcome::NothingToSubmit | SubmissionOutcome::LinkOpened { .. } => None,
        };

        CheckoutResponse {
            outcome,
            notice,
            state,
        }
    }
}

/// Submits the cart to the restaurant backend.
pub async fn place_order(
    dispatcher: &Dispatcher,
    special_instructions: Option<String>,
) -> Result<CheckoutResponse, ApiError> {
    debug!("place_order command");
    let instructions = special_instructions.unwrap_or_default();

    let outcome = dispatcher.place_order(&instructions).await?;
    Ok(CheckoutResponse::new(outcome, dispatcher.state()))
}

/// Opens the pre-filled WhatsApp chat with the restaurant.
pub fn order_via_whatsapp(
    dispatcher: &Dispatcher,
    special_instructions: Option<String>,
) -> Result<CheckoutResponse, ApiError> {
    debug!("order_via_whatsapp command");
    let instructions = special_instructions.unwrap_or_default();

    let outcome = dispatcher.order_via_whatsapp(&instructions)?;
    Ok(CheckoutResponse::new(outcome, dispatcher.state()))
}

/// Closes the sign-in prompt.
pub fn dismiss_auth_prompt(dispatcher: &Dispatcher) -> SubmissionState {
    debug!("dismiss_auth_prompt command");
    dispatcher.dismiss_auth_prompt()
}

/// Current submission state; `submitting` drives the buttons' loading flag.
pub fn get_submission_state(dispatcher: &Dispatcher) -> SubmissionState {
    dispatcher.state()
}
