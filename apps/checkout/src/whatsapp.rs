//! # WhatsApp Link Channel
//!
//! Builds the `wa.me` deep link for a composed order message and hands it to
//! a [`LinkOpener`].
//!
//! ```text
//! compose_message() ──► "🍽️ *New Order Request*\n\n..."
//!                            │
//!                            ▼  encodeURIComponent rules
//!         https://wa.me/917012975494?text=%F0%9F%8D%BD%EF%B8%8F%20*New...
//!                            │
//!                            ▼
//!                  LinkOpener::open(url)
//! ```

use std::io;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::info;

/// Characters `encodeURIComponent` leaves alone: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds `https://wa.me/<digits>?text=<encoded message>`.
///
/// Non-digits in `number` (`+`, spaces, dashes) are dropped.
///
/// ## Example
/// ```rust
/// use bistro_checkout::whatsapp::whatsapp_link;
///
/// let url = whatsapp_link("+91 70129 75494", "Hi there!");
/// assert_eq!(url, "https://wa.me/917012975494?text=Hi%20there!");
/// ```
pub fn whatsapp_link(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!(
        "https://wa.me/{}?text={}",
        digits,
        utf8_percent_encode(message, URI_COMPONENT)
    )
}

/// Opens an external link in a new context (browser tab, WhatsApp app).
///
/// Failures surface from the dispatcher as `CheckoutError::LinkOpen`.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Headless opener: logs the link and leaves opening it to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingLinkOpener;

impl LinkOpener for LoggingLinkOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        info!(url = %url, "WhatsApp order link ready");
        Ok(())
    }
}
