pub mod profiles;
pub mod requests;
pub mod uploads;

pub use profiles::{NewProfile, ProfilePatch, UserProfile};
pub use requests::{ConnectionRequest, Direction, Outcome, ReceivedRequest, RequestStatus};
pub use uploads::{DownloadTarget, UploadSession, UploadTarget};
