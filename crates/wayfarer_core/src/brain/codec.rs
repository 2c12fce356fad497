//! Compact binary genome encoding with rkyv.

use crate::error::{NavError, Result};
use rkyv::de::deserializers::SharedDeserializeMap;
use rkyv::ser::serializers::AllocSerializer;
use rkyv::ser::Serializer;
use rkyv::{AlignedVec, Deserialize};
use wayfarer_data::Genome;

pub fn encode_genome(genome: &Genome) -> Result<Vec<u8>> {
    let mut serializer = AllocSerializer::<1024>::default();
    serializer
        .serialize_value(genome)
        .map_err(|e| NavError::serialization(format!("Rkyv serialization error: {:?}", e)))?;
    Ok(serializer.into_serializer().into_inner().to_vec())
}

/// Validates the archive and the resulting layout before handing it out.
pub fn decode_genome(bytes: &[u8]) -> Result<Genome> {
    let mut aligned = AlignedVec::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    let archived = rkyv::check_archived_root::<Genome>(&aligned)
        .map_err(|e| NavError::serialization(format!("Rkyv validation error: {:?}", e)))?;
    let mut deserializer = SharedDeserializeMap::default();
    let genome: Genome = archived
        .deserialize(&mut deserializer)
        .map_err(|e| NavError::serialization(format!("Rkyv deserialization error: {:?}", e)))?;
    genome.check_layout()?;
    Ok(genome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::GenomeLogic;
    use crate::config::BrainConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_binary_roundtrip_is_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let g = Genome::new_random_with_rng(&BrainConfig::default(), &mut rng);
        let bytes = encode_genome(&g).unwrap();
        assert_eq!(decode_genome(&bytes).unwrap(), g);
    }

    #[test]
    fn test_truncated_bytes_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let g = Genome::new_random_with_rng(&BrainConfig::default(), &mut rng);
        let bytes = encode_genome(&g).unwrap();
        assert!(decode_genome(&bytes[..bytes.len() / 2]).is_err());
        assert!(decode_genome(&[]).is_err());
    }
}
