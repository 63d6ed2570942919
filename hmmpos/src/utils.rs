use std::ops::{Deref, DerefMut};

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashMap;

#[derive(Debug, Default, PartialEq)]
pub struct SerializableHashMap<K, V>(pub HashMap<K, V>)
where
    K: Eq + std::hash::Hash;

impl<K, V> Deref for SerializableHashMap<K, V>
where
    K: Eq + std::hash::Hash,
{
    type Target = HashMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for SerializableHashMap<K, V>
where
    K: Eq + std::hash::Hash,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K, V> Decode for SerializableHashMap<K, V>
where
    K: Decode + Eq + std::hash::Hash + 'static,
    V: Decode + 'static,
{
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let raw: Vec<(K, V)> = Decode::decode(decoder)?;
        Ok(Self(raw.into_iter().collect()))
    }
}

impl<K, V> Encode for SerializableHashMap<K, V>
where
    K: Encode + Eq + std::hash::Hash,
    V: Encode,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        let raw: Vec<(&K, &V)> = self.0.iter().collect();
        Encode::encode(&raw, encoder)?;
        Ok(())
    }
}

/// Returns the index of the largest finite value in `scores`, skipping indices for which `skip`
/// returns true. Ties are broken by the lowest index.
#[inline(always)]
pub fn argmax<F>(scores: impl Iterator<Item = f64>, skip: F) -> Option<(usize, f64)>
where
    F: Fn(usize) -> bool,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.enumerate() {
        if skip(i) || score == f64::NEG_INFINITY {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => (),
            _ => best = Some((i, score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_wins_on_tie() {
        let scores = [-3.0, -1.0, -1.0, -2.0];
        assert_eq!(Some((1, -1.0)), argmax(scores.into_iter(), |_| false));
    }

    #[test]
    fn test_argmax_skip() {
        let scores = [-3.0, -1.0, -1.0, -2.0];
        assert_eq!(Some((2, -1.0)), argmax(scores.into_iter(), |i| i == 1));
    }

    #[test]
    fn test_argmax_all_unreachable() {
        let scores = [f64::NEG_INFINITY; 3];
        assert_eq!(None, argmax(scores.into_iter(), |_| false));
    }

    #[test]
    fn test_serializable_hash_map_roundtrip() {
        let mut map = SerializableHashMap(HashMap::new());
        map.insert("dog".to_string(), vec![0.0, -1.5]);
        map.insert("a/b".to_string(), vec![f64::NEG_INFINITY, -0.5]);

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&map, config).unwrap();
        let (decoded, _): (SerializableHashMap<String, Vec<f64>>, usize) =
            bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(map, decoded);
    }
}
