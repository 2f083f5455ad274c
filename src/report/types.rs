use bytes::Bytes;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::report::locations::{ImageLocation, LightsOffLocation, LockedLocation, RoundsCompleted};

/// Validation messages keyed by field path, in path order
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A photo as received from the client
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    pub file_name: String,
    pub mime_type: String,
    /// Size declared by the sender, checked against `data` when streamed
    pub size: u64,
    pub data: Bytes,
}

impl ImageBlob {
    /// Create a blob whose declared size is the length of `data`
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size: data.len() as u64,
            data,
        }
    }
}

/// One value of the submitted form
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    Text(String),
    File(ImageBlob),
}

/// The untyped form bag exactly as it arrived
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    fields: HashMap<String, RawField>,
}

impl RawSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field. When a name repeats, the first value is kept.
    pub fn insert(&mut self, name: impl Into<String>, value: RawField) {
        if let Entry::Vacant(slot) = self.fields.entry(name.into()) {
            slot.insert(value);
        }
    }

    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name, RawField::Text(value.into()));
    }

    pub fn insert_file(&mut self, name: impl Into<String>, blob: ImageBlob) {
        self.insert(name, RawField::File(blob));
    }

    pub fn get(&self, name: &str) -> Option<&RawField> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One optional photo slot per fixed location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageBag {
    slots: [Option<ImageBlob>; ImageLocation::COUNT],
}

impl ImageBag {
    /// Pick the photos out of a raw form. A zero-length file, or a text value
    /// sent under an image key, counts as no photo.
    pub fn collect(raw: &RawSubmission) -> Self {
        let mut bag = ImageBag::default();
        for location in ImageLocation::ALL {
            if let Some(RawField::File(blob)) = raw.get(location.field_id()) {
                if blob.size > 0 {
                    bag.set(location, blob.clone());
                }
            }
        }
        bag
    }

    pub fn get(&self, location: ImageLocation) -> Option<&ImageBlob> {
        self.slots[location.index()].as_ref()
    }

    pub fn set(&mut self, location: ImageLocation, blob: ImageBlob) {
        self.slots[location.index()] = Some(blob);
    }

    /// Every location in fixed order, paired with its photo if one was sent
    pub fn iter(&self) -> impl Iterator<Item = (ImageLocation, Option<&ImageBlob>)> + '_ {
        ImageLocation::ALL
            .into_iter()
            .map(move |location| (location, self.get(location)))
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// A report that passed validation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReport {
    guard_name: String,
    lights_off_location: LightsOffLocation,
    locked_location: LockedLocation,
    rounds_completed: RoundsCompleted,
    images: ImageBag,
}

impl ValidatedReport {
    pub(crate) fn new(
        guard_name: String,
        lights_off_location: LightsOffLocation,
        locked_location: LockedLocation,
        rounds_completed: RoundsCompleted,
        images: ImageBag,
    ) -> Self {
        Self {
            guard_name,
            lights_off_location,
            locked_location,
            rounds_completed,
            images,
        }
    }

    pub fn guard_name(&self) -> &str {
        &self.guard_name
    }

    pub fn lights_off_location(&self) -> LightsOffLocation {
        self.lights_off_location
    }

    pub fn locked_location(&self) -> LockedLocation {
        self.locked_location
    }

    pub fn rounds_completed(&self) -> RoundsCompleted {
        self.rounds_completed
    }

    pub fn images(&self) -> &ImageBag {
        &self.images
    }
}
