//! The traversal engine.
//!
//! A walk is driven by a session ([`PrimarySession`] or [`ResumeSession`]).
//! The session builds a navigator for the chosen [`Subscription`], an agent
//! doing the file-system work, and a navigation frame holding the callback
//! together with its decorations (node filter, listener) and invoker
//! (inline or accelerated).

pub mod accelerate;
mod agent;
mod files;
pub mod filter;
mod folders;
mod frame;
pub mod hooks;
pub mod item;
pub mod listen;
pub mod metrics;
mod navigator;
pub mod notify;
pub mod options;
pub mod persist;
pub mod resume;
pub mod sampling;
pub mod scope;
pub mod session;
mod universal;

pub use accelerate::{AccelerationOptions, JobOutput};
pub use filter::{
    new_compound_filter, new_node_filter, CompoundFilter, CompoundFilterDef, CompoundFilterKind,
    FilterDef, FilterDefinitions, FilterKind, NodeFilter, TriStateBool,
};
pub use hooks::Hooks;
pub use item::{DirEntry, ExtendedItem, NodeInfo, TraverseItem};
pub use listen::{ListenBehaviour, ListenDefinitions, ListenPredicate, ListenTriggers, ListeningState};
pub use metrics::{MetricKind, Metrics, TraverseResult};
pub use notify::Notifications;
pub use options::{
    Behaviours, Callback, CustomFilters, OptionsStore, PersistOptions, SortBehaviour, SortOrder,
    Subscription, TraverseOptions,
};
pub use persist::{ActiveState, NodeProgress, PersistedState, Restorer, StateMarshaller};
pub use resume::ResumeStrategy;
pub use sampling::{SampleQuota, SampleType, SamplingIteration, SamplingOptions};
pub use scope::FilterScope;
pub use session::{PrimarySession, ResumeInfo, ResumeSession};
