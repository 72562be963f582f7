pub mod feed;
pub mod ledger;
pub mod lifecycle;
pub mod profiles;
pub mod uploads;

pub use feed::{FeedGenerator, FeedPage};
pub use ledger::ConnectionLedger;
pub use lifecycle::RequestLifecycle;
pub use profiles::ProfileService;
pub use uploads::UploadCoordinator;
