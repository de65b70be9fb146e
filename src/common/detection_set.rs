use std::collections::BTreeMap;
use serde::Serialize;
use crate::common::Detection;

/// Detections grouped by class id.
///
/// Within a class, detections keep the order in which suppression emitted
/// them (descending confidence). A class with no detections has no key.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DetectionSet {
    by_class: BTreeMap<usize, Vec<Detection>>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends `detection` to the sequence of its class.
    pub fn push(&mut self, detection: Detection) {
        self.by_class
            .entry(detection.class_id)
            .or_default()
            .push(detection);
    }

    /// Total number of detections over all classes.
    pub fn len(&self) -> usize {
        self.by_class.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }

    pub fn get(&self, class_id: usize) -> Option<&[Detection]> {
        self.by_class.get(&class_id).map(Vec::as_slice)
    }

    pub fn contains_class(&self, class_id: usize) -> bool {
        self.by_class.contains_key(&class_id)
    }

    pub fn class_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_class.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Detection])> {
        self.by_class.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// All detections, class by class in ascending class id order.
    pub fn detections(&self) -> impl Iterator<Item = &Detection> {
        self.by_class.values().flatten()
    }

    pub fn into_inner(self) -> BTreeMap<usize, Vec<Detection>> {
        self.by_class
    }
}

impl FromIterator<Detection> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = Detection>>(iter: I) -> Self {
        let mut set = DetectionSet::new();
        for detection in iter {
            set.push(detection);
        }
        set
    }
}

impl Extend<Detection> for DetectionSet {
    fn extend<I: IntoIterator<Item = Detection>>(&mut self, iter: I) {
        for detection in iter {
            self.push(detection);
        }
    }
}
