//! Navigation core: reconciles the selected page, the active room and the
//! browser URL.
//!
//! The logic is a pure reducer ([`transition`]) over [`NavigationState`].
//! [`NavigationCoordinator`] executes the effects it emits against the ports
//! and feeds the completions back in, each tagged with a [`Ticket`] so stale
//! results are dropped.

mod coordinator;
mod event;
mod machine;
mod state;

pub use coordinator::{
    DispatchContext, LookupRunner, NavigationCoordinator, NavigationError, PendingLookup,
};
pub use event::{NavigationEffect, NavigationEvent, Transition};
pub use machine::transition;
pub use state::{NavigationState, PendingSlugSwitch, Phase, Ticket};
