use crate::config::{load_config, Config};
use crate::report::validator::{GUARD_NAME, LIGHTS_OFF_LOCATION, LOCKED_LOCATION, ROUNDS_COMPLETED};
use crate::report::{ImageBlob, ImageLocation, RawSubmission};
use bytes::Bytes;

const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

/// Check if a test is enabled via environment variable
fn is_test_enabled(env_var: &str) -> bool {
    std::env::var(env_var)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Check if tests against the real Google APIs are enabled
pub fn is_google_enabled() -> bool {
    is_test_enabled("ENABLE_GOOGLE_TESTS")
}

/// Load test configuration from config.toml
pub fn load_test_config() -> Result<Config, anyhow::Error> {
    let config_path = "config.toml";

    load_config(config_path).map_err(|e| anyhow::anyhow!("Failed to load config.toml: {}", e))
}

/// A valid report without photos: Jane Doe, Back Office, Kitchen, 3 rounds
pub fn create_test_submission() -> RawSubmission {
    let mut raw = RawSubmission::new();
    raw.insert_text(GUARD_NAME, "Jane Doe");
    raw.insert_text(LIGHTS_OFF_LOCATION, "Back Office");
    raw.insert_text(LOCKED_LOCATION, "Kitchen");
    raw.insert_text(ROUNDS_COMPLETED, "3");
    raw
}

/// Creates a JPEG photo of `len` bytes
///
/// The content starts with the JPEG magic bytes and is otherwise filler.
pub fn create_test_image(file_name: &str, len: usize) -> ImageBlob {
    let mut data: Vec<u8> = JPEG_MAGIC.iter().copied().take(len).collect();
    data.extend((data.len()..len).map(|i| (i % 251) as u8));
    ImageBlob::new(file_name, "image/jpeg", Bytes::from(data))
}

/// A valid report with one small photo for each of `locations`
pub fn create_test_submission_with_images(locations: &[ImageLocation]) -> RawSubmission {
    let mut raw = create_test_submission();
    for location in locations {
        raw.insert_file(
            location.field_id(),
            create_test_image(&format!("{}.jpg", location.field_id()), 1024),
        );
    }
    raw
}
