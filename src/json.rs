use crate::codec::ChainCodec;
use crate::error::Result;
use crate::model::ChainModel;

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ChainCodec for JsonCodec {
    fn format(&self) -> &str {
        "json"
    }

    fn encode_model(&self, model: &ChainModel) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(model)?
        } else {
            serde_json::to_string(model)?
        };
        Ok(text)
    }

    fn decode_model(&self, text: &str) -> Result<ChainModel> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::SimpleBlockchain;
    use crate::error::ChainError;

    fn sample() -> SimpleBlockchain {
        let mut chain = SimpleBlockchain::with_id("C1");
        chain.append_at(b"alpha".to_vec(), 1_000).unwrap();
        chain.append_at(b"beta".to_vec(), 2_000).unwrap();
        chain
    }

    #[test]
    fn roundtrip() {
        let chain = sample();
        for codec in [JsonCodec::new(), JsonCodec::pretty()] {
            let text = codec.serialize(&chain).unwrap();
            let back = codec.deserialize(&text).unwrap();
            assert_eq!(back, chain);
            assert_eq!(back.last_index(), Some(1));
        }
    }

    #[test]
    fn uses_camel_case_field_names() {
        let text = JsonCodec::new().serialize(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["blockchainId"], "C1");
        assert_eq!(value["count"], 2);
        assert_eq!(value["firstIndex"], 0);
        assert_eq!(value["lastIndex"], 1);
        assert_eq!(value["chainLinks"][1]["data"], "62657461");
        assert!(value["chainLinks"][0]["previousHash"].is_string());
    }

    #[test]
    fn garbage_is_parse_error_not_broken_chain() {
        let err = JsonCodec::new().deserialize("{not json").unwrap_err();
        assert!(matches!(err, ChainError::Json(_)));
        assert!(!err.is_broken_chain());
    }

    #[test]
    fn tampered_json_is_broken_chain() {
        let codec = JsonCodec::new();
        let text = codec.serialize(&sample()).unwrap();
        // "alpha" -> "ALPHA"
        let tampered = text.replace("616c706861", "414c504841");
        let err = codec.deserialize(&tampered).unwrap_err();
        assert!(err.is_broken_chain());
        let unverified = codec.deserialize_unverified(&tampered).unwrap();
        assert_eq!(unverified.links()[0].data(), b"ALPHA");
    }
}
