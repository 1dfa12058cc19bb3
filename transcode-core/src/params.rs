//! Parameter-set data shared between codecs and containers.

use std::fmt;

/// Kind of in-band codec configuration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterSetKind {
    /// Video parameter set (H.265 VPS).
    Video,
    /// Sequence parameter set (SPS).
    Sequence,
    /// Picture parameter set (PPS).
    Picture,
}

impl ParameterSetKind {
    /// All kinds in header emission order.
    pub const ALL: [ParameterSetKind; 3] = [Self::Video, Self::Sequence, Self::Picture];
}

impl fmt::Display for ParameterSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "VPS"),
            Self::Sequence => write!(f, "SPS"),
            Self::Picture => write!(f, "PPS"),
        }
    }
}

/// Deduplicated parameter sets of a stream, per kind in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSets {
    video: Vec<Vec<u8>>,
    sequence: Vec<Vec<u8>>,
    picture: Vec<Vec<u8>>,
}

impl ParameterSets {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blobs of one kind, first-seen first. Empty if none were seen.
    pub fn get(&self, kind: ParameterSetKind) -> &[Vec<u8>] {
        match kind {
            ParameterSetKind::Video => &self.video,
            ParameterSetKind::Sequence => &self.sequence,
            ParameterSetKind::Picture => &self.picture,
        }
    }

    /// Add `blob` unless an identical one of the same kind is present.
    ///
    /// Returns `true` when the blob was new.
    pub fn insert(&mut self, kind: ParameterSetKind, blob: &[u8]) -> bool {
        let sets = match kind {
            ParameterSetKind::Video => &mut self.video,
            ParameterSetKind::Sequence => &mut self.sequence,
            ParameterSetKind::Picture => &mut self.picture,
        };
        if sets.iter().any(|existing| existing.as_slice() == blob) {
            return false;
        }
        sets.push(blob.to_vec());
        true
    }

    /// Total number of blobs over all kinds.
    pub fn len(&self) -> usize {
        self.video.len() + self.sequence.len() + self.picture.len()
    }

    /// Check whether no blob of any kind was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(kind, blob)` in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterSetKind, &[u8])> {
        ParameterSetKind::ALL
            .into_iter()
            .flat_map(move |kind| self.get(kind).iter().map(move |blob| (kind, blob.as_slice())))
    }
}
