// App layer: the HTTP ingress wired to the dispatcher.

pub mod confirmation;
pub mod envelope;
pub mod ingress;

pub use ingress::{build_router, AppState};
