//! Search-query lifecycle.
//!
//! - [`Debouncer`]: trailing-edge timer that settles raw keystrokes
//! - [`QueryLifecycle`]: synchronous state machine (term, request state, movies)
//! - [`SearchSession`]: per-client actor wiring the two to the catalog and
//!   the trending store, publishing [`SearchSnapshot`]s
//! - [`view`]: render-ready projections of a snapshot

mod debounce;
mod lifecycle;
mod session;
mod types;
pub mod view;

pub use debounce::{Debounced, Debouncer};
pub use lifecycle::QueryLifecycle;
pub use session::{SearchSession, SessionError, SessionHandle};
pub use types::*;
pub use view::{MovieCard, SearchView, TrendingCard};
