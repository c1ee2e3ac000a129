//! Authentication module

pub mod context;
pub mod error_handler;
pub mod guard;
pub mod state;

// Re-export commonly used items
pub use context::{AuthContext, AuthContextBuilder};
pub use error_handler::{
    ErrorDescriptor, ErrorDisposition, ErrorInterceptor, with_auth_error_handling,
};
pub use guard::{GuardOutcome, GuardState, NavigationGuard, RouteTable};
pub use state::SessionState;
