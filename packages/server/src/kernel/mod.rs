//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{
    AirtableSync, BuildHookTrigger, DiscordNotifier, NoopRebuildTrigger, SanityRecordStore,
    ServerDeps,
};
pub use test_dependencies::{
    CrmCall, MockNotifier, MockRebuildTrigger, MockRecordStore, MockRelationalSync, PatchCall,
    TestDependencies,
};
pub use traits::*;
