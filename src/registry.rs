use crate::chain::SimpleBlockchain;
use crate::codec::ChainCodec;
use crate::error::{ChainError, Result};
use crate::json::JsonCodec;
use crate::xml::XmlCodec;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps format keys to codecs. Keys are case-insensitive.
///
/// Built once at startup and handed to whatever needs codec lookup.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn ChainCodec>>,
    default_key: Option<String>,
}

impl CodecRegistry {
    /// An empty registry with no default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the JSON and XML codecs, with JSON as default.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.codecs
            .insert("json".into(), Arc::new(JsonCodec::pretty()) as Arc<dyn ChainCodec>);
        reg.codecs.insert("xml".into(), Arc::new(XmlCodec::new()));
        reg.default_key = Some("json".into());
        reg
    }

    /// Register `codec` under `key`, replacing any codec already there.
    /// The first codec registered into an empty registry becomes the default.
    pub fn register(&mut self, key: &str, codec: Arc<dyn ChainCodec>) -> Result<()> {
        let key = normalize(key)?;
        debug!("registering codec '{}' ({})", key, codec.format());
        if self.default_key.is_none() {
            self.default_key = Some(key.clone());
        }
        self.codecs.insert(key, codec);
        Ok(())
    }

    /// Look up the codec registered under `key`.
    pub fn get(&self, key: &str) -> Result<Arc<dyn ChainCodec>> {
        let key = normalize(key)?;
        self.codecs
            .get(&key)
            .cloned()
            .ok_or(ChainError::SerializerKeyNotFound(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        normalize(key)
            .map(|k| self.codecs.contains_key(&k))
            .unwrap_or(false)
    }

    /// Make an already registered key the default.
    pub fn set_default(&mut self, key: &str) -> Result<()> {
        let key = normalize(key)?;
        if !self.codecs.contains_key(&key) {
            return Err(ChainError::SerializerKeyNotFound(key));
        }
        self.default_key = Some(key);
        Ok(())
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    pub fn default_codec(&self) -> Result<Arc<dyn ChainCodec>> {
        match &self.default_key {
            Some(key) => self.get(key),
            None => Err(ChainError::SerializerKeyNull),
        }
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.codecs.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Serialize with the codec under `key`, or the default when `None`.
    pub fn serialize_with(&self, key: Option<&str>, chain: &SimpleBlockchain) -> Result<String> {
        self.resolve(key)?.serialize(chain)
    }

    /// Deserialize and verify with the codec under `key`, or the default.
    pub fn deserialize_with(&self, key: Option<&str>, text: &str) -> Result<SimpleBlockchain> {
        self.resolve(key)?.deserialize(text)
    }

    fn resolve(&self, key: Option<&str>) -> Result<Arc<dyn ChainCodec>> {
        match key {
            Some(k) => self.get(k),
            None => self.default_codec(),
        }
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("keys", &self.keys())
            .field("default_key", &self.default_key)
            .finish()
    }
}

fn normalize(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ChainError::SerializerKeyNull);
    }
    Ok(key.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChainModel;

    /// Codec that emits only the blockchain id.
    struct IdOnly;

    impl ChainCodec for IdOnly {
        fn format(&self) -> &str {
            "id"
        }

        fn encode_model(&self, model: &ChainModel) -> Result<String> {
            Ok(model.blockchain_id.clone())
        }

        fn decode_model(&self, text: &str) -> Result<ChainModel> {
            Ok(ChainModel {
                blockchain_id: text.into(),
                count: 0,
                first_index: None,
                last_index: None,
                chain_links: Vec::new(),
            })
        }
    }

    #[test]
    fn builtins_present_with_json_default() {
        let reg = CodecRegistry::with_builtins();
        assert_eq!(reg.keys(), vec!["json", "xml"]);
        assert_eq!(reg.default_key(), Some("json"));
        assert_eq!(reg.default_codec().unwrap().format(), "json");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let reg = CodecRegistry::with_builtins();
        assert_eq!(reg.get("XML").unwrap().format(), "xml");
        assert!(reg.contains(" Json "));
    }

    #[test]
    fn unknown_and_empty_keys() {
        let reg = CodecRegistry::with_builtins();
        assert!(matches!(
            reg.get("yaml"),
            Err(ChainError::SerializerKeyNotFound(k)) if k == "yaml"
        ));
        assert!(matches!(reg.get("  "), Err(ChainError::SerializerKeyNull)));
        assert!(CodecRegistry::new().default_codec().is_err());
    }

    #[test]
    fn register_replaces_existing() {
        let mut reg = CodecRegistry::with_builtins();
        reg.register("JSON", Arc::new(IdOnly)).unwrap();
        assert_eq!(reg.get("json").unwrap().format(), "id");
        assert_eq!(reg.keys().len(), 2);
    }

    #[test]
    fn set_default_requires_registered_key() {
        let mut reg = CodecRegistry::with_builtins();
        assert!(reg.set_default("yaml").is_err());
        reg.set_default("XML").unwrap();
        assert_eq!(reg.default_key(), Some("xml"));
    }

    #[test]
    fn first_registration_becomes_default() {
        let mut reg = CodecRegistry::new();
        reg.register("id", Arc::new(IdOnly)).unwrap();
        let chain = SimpleBlockchain::with_id("abc");
        assert_eq!(reg.serialize_with(None, &chain).unwrap(), "abc");
        assert_eq!(reg.deserialize_with(Some("ID"), "abc").unwrap(), chain);
    }
}
