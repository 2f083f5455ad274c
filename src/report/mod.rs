pub mod locations;
pub mod types;
pub mod validator;

pub use locations::{normalize, ImageLocation, LightsOffLocation, LockedLocation, RoundsCompleted};
pub use types::{FieldErrors, ImageBag, ImageBlob, RawField, RawSubmission, ValidatedReport};
pub use validator::{ImageRules, ReportValidator};
