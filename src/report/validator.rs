use crate::report::locations::{ImageLocation, LightsOffLocation, LockedLocation, RoundsCompleted};
use crate::report::types::{FieldErrors, ImageBag, ImageBlob, RawField, RawSubmission, ValidatedReport};

pub const GUARD_NAME: &str = "guardName";
pub const LIGHTS_OFF_LOCATION: &str = "lightsOffLocation";
pub const LOCKED_LOCATION: &str = "lockedLocation";
pub const ROUNDS_COMPLETED: &str = "roundsCompleted";

const MIN_GUARD_NAME_CHARS: usize = 2;

pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub const DEFAULT_ACCEPTED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Constraints applied to each submitted photo
#[derive(Debug, Clone)]
pub struct ImageRules {
    /// When false, size and type checks always pass
    pub enforce: bool,
    pub max_bytes: u64,
    pub accepted_types: Vec<String>,
}

impl Default for ImageRules {
    fn default() -> Self {
        Self {
            enforce: true,
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            accepted_types: DEFAULT_ACCEPTED_IMAGE_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl ImageRules {
    /// Rules for contexts where the binary metadata cannot be trusted
    pub fn relaxed() -> Self {
        Self {
            enforce: false,
            ..Self::default()
        }
    }

    fn check(&self, location: ImageLocation, blob: &ImageBlob) -> Vec<String> {
        let mut messages = Vec::new();
        if !self.enforce {
            return messages;
        }

        if blob.size > self.max_bytes {
            messages.push(format!(
                "{}: Max image size is {}MB.",
                location.label(),
                self.max_bytes / (1024 * 1024)
            ));
        }

        let accepted = self
            .accepted_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&blob.mime_type));
        if !accepted {
            messages.push(format!(
                "{}: Only .jpg, .jpeg, .png, and .webp formats are accepted.",
                location.label()
            ));
        }

        messages
    }
}

/// Checks a raw form bag against the guard report shape.
///
/// Every violated field is reported; validation never stops at the first
/// problem. The validator holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct ReportValidator {
    rules: ImageRules,
}

enum TextValue<'a> {
    Missing,
    Text(&'a str),
    NotText,
}

fn text_value<'a>(raw: &'a RawSubmission, name: &str) -> TextValue<'a> {
    match raw.get(name) {
        None => TextValue::Missing,
        Some(RawField::Text(value)) => TextValue::Text(value),
        Some(RawField::File(_)) => TextValue::NotText,
    }
}

fn push_error(errors: &mut FieldErrors, path: &str, message: impl Into<String>) {
    errors
        .entry(path.to_string())
        .or_default()
        .push(message.into());
}

/// Parse a required choice field, recording the matching message on failure
fn choice<T>(
    raw: &RawSubmission,
    path: &str,
    required_message: &str,
    invalid_message: &str,
    parse: impl Fn(&str) -> Option<T>,
    errors: &mut FieldErrors,
) -> Option<T> {
    match text_value(raw, path) {
        TextValue::Missing => {
            push_error(errors, path, required_message);
            None
        }
        TextValue::Text(value) => {
            let parsed = parse(value);
            if parsed.is_none() {
                push_error(errors, path, invalid_message);
            }
            parsed
        }
        TextValue::NotText => {
            push_error(errors, path, invalid_message);
            None
        }
    }
}

impl ReportValidator {
    pub fn new(rules: ImageRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ImageRules {
        &self.rules
    }

    pub fn validate(&self, raw: &RawSubmission) -> Result<ValidatedReport, FieldErrors> {
        let mut errors = FieldErrors::new();

        let guard_name = match text_value(raw, GUARD_NAME) {
            TextValue::Missing => {
                push_error(&mut errors, GUARD_NAME, "Guard Name is required.");
                None
            }
            TextValue::Text(name) => {
                let chars = name.chars().count();
                if chars == 0 {
                    push_error(&mut errors, GUARD_NAME, "Guard Name is required.");
                }
                if chars < MIN_GUARD_NAME_CHARS {
                    push_error(&mut errors, GUARD_NAME, "Name must be at least 2 characters.");
                    None
                } else {
                    Some(name.to_string())
                }
            }
            TextValue::NotText => {
                push_error(&mut errors, GUARD_NAME, "Guard Name must be text.");
                None
            }
        };

        let lights_off = choice(
            raw,
            LIGHTS_OFF_LOCATION,
            "Lights Off Location is required.",
            "Please select a valid location for Lights Off.",
            LightsOffLocation::from_label,
            &mut errors,
        );

        let locked = choice(
            raw,
            LOCKED_LOCATION,
            "Locked Location is required.",
            "Please select a valid location for Locked Location.",
            LockedLocation::from_label,
            &mut errors,
        );

        let rounds = choice(
            raw,
            ROUNDS_COMPLETED,
            "Rounds Completed is required.",
            "Please select a valid number of rounds.",
            RoundsCompleted::parse,
            &mut errors,
        );

        let images = ImageBag::collect(raw);
        for (location, blob) in images.iter() {
            if let Some(blob) = blob {
                for message in self.rules.check(location, blob) {
                    push_error(&mut errors, location.field_id(), message);
                }
            }
        }

        match (guard_name, lights_off, locked, rounds) {
            (Some(guard_name), Some(lights_off), Some(locked), Some(rounds))
                if errors.is_empty() =>
            {
                Ok(ValidatedReport::new(
                    guard_name, lights_off, locked, rounds, images,
                ))
            }
            _ => Err(errors),
        }
    }
}
