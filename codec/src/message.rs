//! Small fixed-layout messages that share the update primitives.

use bitstream::BitReader;
use wire::Vector3;

use crate::error::CodecResult;

/// Where the player's corpse sits on a transport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorpseTransportQuery {
    pub position: Vector3,
    pub facing: f32,
}

impl CorpseTransportQuery {
    pub fn decode(data: &[u8]) -> CodecResult<Self> {
        let mut reader = BitReader::new(data);
        Ok(Self {
            position: Vector3::read(&mut reader)?,
            facing: reader.read_f32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use bitstream::BitWriter;

    #[test]
    fn decodes_position_and_facing() {
        let mut w = BitWriter::new();
        for v in [1.0f32, -2.0, 3.5, 0.25] {
            w.write_f32(v).unwrap();
        }
        let query = CorpseTransportQuery::decode(&w.finish()).unwrap();
        assert_eq!(query.position, Vector3::new(1.0, -2.0, 3.5));
        assert!((query.facing - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn short_message_is_out_of_range() {
        let err = CorpseTransportQuery::decode(&[0; 12]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }
}
