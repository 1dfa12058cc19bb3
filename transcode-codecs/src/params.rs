//! Parameter-set deduplication and packet rewriting.
//!
//! Many encoders repeat their SPS/PPS in front of every keyframe, or every
//! frame. MP4/MOV wants them exactly once, in the sample description. The
//! [`ParameterSetRegistry`] strips them from each packet as it passes and
//! keeps one copy of every distinct blob.

use tracing::debug;
use transcode_core::bitstream::find_start_code;
use transcode_core::error::BitstreamError;
use transcode_core::{ParameterSetKind, ParameterSets, Result};

/// Codec-specific knowledge of how a packet payload is framed.
pub trait BitstreamSyntax: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Whether payloads pass through untouched (no parameter sets exist).
    fn is_passthrough(&self) -> bool {
        false
    }

    /// Parameter-set kinds a decoder needs for this codec.
    fn expected_kinds(&self) -> &'static [ParameterSetKind] {
        &[]
    }

    /// Split a payload into units.
    fn units<'a>(&self, payload: &'a [u8]) -> Result<Vec<&'a [u8]>>;

    /// Parameter-set kind of `unit`, or `None` for coded-picture data.
    fn parameter_set_kind(&self, unit: &[u8]) -> Option<ParameterSetKind>;

    /// Append a non-parameter-set unit to the output sample.
    fn write_unit(&self, out: &mut Vec<u8>, unit: &[u8]) -> Result<()>;
}

/// Syntax for codecs without in-band parameter sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueSyntax;

impl BitstreamSyntax for OpaqueSyntax {
    fn name(&self) -> &'static str {
        "opaque"
    }

    fn is_passthrough(&self) -> bool {
        true
    }

    fn units<'a>(&self, payload: &'a [u8]) -> Result<Vec<&'a [u8]>> {
        Ok(vec![payload])
    }

    fn parameter_set_kind(&self, _unit: &[u8]) -> Option<ParameterSetKind> {
        None
    }

    fn write_unit(&self, out: &mut Vec<u8>, unit: &[u8]) -> Result<()> {
        out.extend_from_slice(unit);
        Ok(())
    }
}

/// Split an Annex B payload, rejecting payloads that carry no start code.
pub(crate) fn annex_b_units(payload: &[u8]) -> Result<Vec<&[u8]>> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    if find_start_code(payload).is_none() {
        return Err(BitstreamError::InvalidStartCode { offset: 0 }.into());
    }
    Ok(transcode_core::bitstream::AnnexBUnits::new(payload).collect())
}

/// Accumulates the distinct parameter sets of one stream.
///
/// Owned by exactly one pump; [`observe`](ParameterSetRegistry::observe) is
/// the only way to mutate it.
pub struct ParameterSetRegistry {
    syntax: Box<dyn BitstreamSyntax>,
    sets: ParameterSets,
    stripped: u64,
}

impl ParameterSetRegistry {
    /// Create an empty registry for the given bitstream syntax.
    pub fn new(syntax: Box<dyn BitstreamSyntax>) -> Self {
        Self {
            syntax,
            sets: ParameterSets::new(),
            stripped: 0,
        }
    }

    /// Record the parameter sets in `payload` and return the payload without them.
    ///
    /// The remaining units are re-framed for the container by the syntax.
    /// `payload` itself is left untouched.
    pub fn observe(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        if self.syntax.is_passthrough() {
            return Ok(payload.to_vec());
        }

        let mut out = Vec::with_capacity(payload.len());
        for unit in self.syntax.units(payload)? {
            match self.syntax.parameter_set_kind(unit) {
                Some(kind) => {
                    self.stripped += 1;
                    if self.sets.insert(kind, unit) {
                        debug!(
                            syntax = self.syntax.name(),
                            %kind,
                            size = unit.len(),
                            "new parameter set"
                        );
                    }
                }
                None => self.syntax.write_unit(&mut out, unit)?,
            }
        }
        Ok(out)
    }

    /// Distinct parameter sets seen so far.
    pub fn parameter_sets(&self) -> &ParameterSets {
        &self.sets
    }

    /// Expected kinds for which no parameter set has been seen.
    pub fn missing_kinds(&self) -> Vec<ParameterSetKind> {
        self.syntax
            .expected_kinds()
            .iter()
            .copied()
            .filter(|kind| self.sets.get(*kind).is_empty())
            .collect()
    }

    /// Number of in-band parameter-set units removed from packets.
    pub fn stripped(&self) -> u64 {
        self.stripped
    }

    /// Name of the bitstream syntax in use.
    pub fn syntax_name(&self) -> &'static str {
        self.syntax.name()
    }
}

impl std::fmt::Debug for ParameterSetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSetRegistry")
            .field("syntax", &self.syntax.name())
            .field("sets", &self.sets.len())
            .field("stripped", &self.stripped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_passthrough() {
        let mut registry = ParameterSetRegistry::new(Box::new(OpaqueSyntax));
        let payload = [0u8, 0, 1, 0x67, 0x42];
        assert_eq!(registry.observe(&payload).unwrap(), payload.to_vec());
        assert!(registry.parameter_sets().is_empty());
        assert_eq!(registry.stripped(), 0);
        assert!(registry.missing_kinds().is_empty());
    }

    #[test]
    fn test_annex_b_units_requires_start_code() {
        assert!(annex_b_units(&[0x65, 0x88]).is_err());
        assert!(annex_b_units(&[]).unwrap().is_empty());
    }
}
