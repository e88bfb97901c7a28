//! Login Flows
//!
//! Construction of the outbound authorization request for the two supported flows:
//!
//! - **Authorization Code Flow** (RFC 6749 Section 4.1): the provider redirects back to the site's callback endpoint
//! - **Implicit Flow** (OIDC Core Section 3.2): the ID token is returned to the login page and bound to a nonce

pub mod authorize;

pub use authorize::{AuthorizationRequestBuilder, AUTH_SCOPE_CONTEXT};
