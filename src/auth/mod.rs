//! Authentication and session management for the IG dealing API.
//!
//! A session is opened by posting an identifier and password together with
//! the application's API key. The broker answers with two tokens in the
//! response headers:
//!
//! - `CST`, the client token, valid for the whole session
//! - `X-SECURITY-TOKEN`, the account token, reissued on account switch
//!
//! Every later request carries both. [`Session`] owns the tokens and the
//! rules for how they change; [`build_headers`] turns a session and a
//! [`RequestClass`] into the exact header set to send.
//!
//! ```no_run
//! use ig_dealing_rs::{AccountType, IgClient};
//!
//! # fn example() -> ig_dealing_rs::Result<()> {
//! let mut client = IgClient::new("api-key", AccountType::Demo)?;
//! let info = client.login("identifier", "password")?;
//! println!("Logged into {}", info["currentAccountId"]);
//!
//! client.switch_account("ABC123")?;
//! client.logout();
//! # Ok(())
//! # }
//! ```

mod headers;
mod session;

pub use headers::{
    build_headers, RequestClass, API_KEY_HEADER, CLIENT_TOKEN_HEADER, METHOD_OVERRIDE_HEADER,
    SECURITY_TOKEN_HEADER,
};
pub use session::Session;
