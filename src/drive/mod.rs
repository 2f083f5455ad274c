pub mod error;
#[cfg(test)]
pub mod fake;
pub mod google;
pub mod storage;

pub use error::DriveError;
#[cfg(test)]
pub use fake::FakeObjectStore;
pub use google::GoogleDrive;
pub use storage::{ObjectStore, StoredObject};
