use crate::codec::ChainCodec;
use crate::error::{ChainError, Result};
use crate::model::{ChainModel, LinkModel};
use serde::{Deserialize, Serialize};

const ROOT: &str = "blockchain";

/// XML codec backed by `quick-xml`'s serde support.
///
/// Layout:
///
/// ```xml
/// <blockchain blockchainId="..">
///   <count>..</count>
///   <firstIndex>..</firstIndex><lastIndex>..</lastIndex>
///   <chainLinks><chainLink>..</chainLink>..</chainLinks>
/// </blockchain>
/// ```
///
/// The id is an attribute because element text is whitespace-trimmed on
/// read, and ids must come back byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl XmlCodec {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XmlChain {
    #[serde(rename = "@blockchainId")]
    blockchain_id: String,
    count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_index: Option<u64>,
    #[serde(default)]
    chain_links: XmlLinks,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlLinks {
    #[serde(rename = "chainLink", default)]
    links: Vec<LinkModel>,
}

impl ChainCodec for XmlCodec {
    fn format(&self) -> &str {
        "xml"
    }

    fn encode_model(&self, model: &ChainModel) -> Result<String> {
        let doc = XmlChain {
            blockchain_id: model.blockchain_id.clone(),
            count: model.count,
            first_index: model.first_index,
            last_index: model.last_index,
            chain_links: XmlLinks {
                links: model.chain_links.clone(),
            },
        };
        quick_xml::se::to_string_with_root(ROOT, &doc).map_err(|e| ChainError::Xml(e.to_string()))
    }

    fn decode_model(&self, text: &str) -> Result<ChainModel> {
        let doc: XmlChain =
            quick_xml::de::from_str(text).map_err(|e| ChainError::Xml(e.to_string()))?;
        Ok(ChainModel {
            blockchain_id: doc.blockchain_id,
            count: doc.count,
            first_index: doc.first_index,
            last_index: doc.last_index,
            chain_links: doc.chain_links.links,
        })
    }
}
