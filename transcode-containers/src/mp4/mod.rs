//! MP4/ISOBMFF sample description records.
//!
//! MP4 and MOV carry H.264/H.265 parameter sets out of band, in the avcC or
//! hvcC box of the sample entry, and expect samples with length-prefixed NAL
//! units.

mod config;

pub use config::{avc_decoder_configuration, hevc_decoder_configuration};
