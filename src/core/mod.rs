//! Core Components
//!
//! Collaborator interfaces and the building blocks of login initiation.

pub mod clock;
pub mod hooks;
pub mod scope;
pub mod session;
pub mod state;
pub mod store;
pub mod transport;

pub use clock::*;
pub use hooks::*;
pub use scope::*;
pub use session::*;
pub use state::*;
pub use store::*;
pub use transport::*;
