use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Pretty-prints any serializable object. Serializing the plain data types in this workspace
/// can't fail, so this doesn't return a Result.
pub fn to_json<T: Serialize>(obj: &T) -> String {
    match serde_json::to_string_pretty(obj) {
        Ok(x) => x,
        Err(err) => panic!("Can't serialize to JSON: {}", err),
    }
}

pub fn write_json<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, to_json(obj))?;
    info!("Wrote {}", path);
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let contents = fs_err::read_to_string(path)?;
    let obj =
        serde_json::from_str(&contents).with_context(|| format!("Can't parse JSON in {}", path))?;
    Ok(obj)
}

// For BTreeMaps with struct keys. See https://github.com/serde-rs/json/issues/402.

pub fn serialize_btreemap<S: Serializer, K: Serialize, V: Serialize>(
    map: &BTreeMap<K, V>,
    s: S,
) -> Result<S::Ok, S::Error> {
    map.iter().collect::<Vec<(_, _)>>().serialize(s)
}

pub fn deserialize_btreemap<
    'de,
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
>(
    d: D,
) -> Result<BTreeMap<K, V>, D::Error> {
    let vec = <Vec<(K, V)>>::deserialize(d)?;
    Ok(vec.into_iter().collect())
}
