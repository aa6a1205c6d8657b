// Services layer for business logic
// Services own business logic, validation, and permission checks, calling
// storage directly. Ledger-affecting operations run in a unit of work.

pub mod directory;
pub mod event_catalog;
pub mod ledger;
pub mod participation;
pub mod reward;

#[cfg(test)]
mod test_support;

pub use directory::DirectoryService;
pub use event_catalog::EventCatalogService;
pub use ledger::{AppliedChange, LedgerService};
pub use participation::ParticipationService;
pub use reward::RewardService;
