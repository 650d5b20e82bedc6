use crate::chain::SimpleBlockchain;
use crate::error::Result;
use crate::model::ChainModel;

/// A pluggable text format for chains.
///
/// Implementors only convert between text and [`ChainModel`]; rebuilding and
/// verifying the chain is shared.
pub trait ChainCodec: Send + Sync {
    /// Short format name, e.g. `"json"`. Also used as a file extension.
    fn format(&self) -> &str;

    /// Render the wire model in this codec's syntax.
    fn encode_model(&self, model: &ChainModel) -> Result<String>;

    /// Parse text in this codec's syntax into the wire model.
    fn decode_model(&self, text: &str) -> Result<ChainModel>;

    fn serialize(&self, chain: &SimpleBlockchain) -> Result<String> {
        self.encode_model(&ChainModel::from(chain))
    }

    /// Parse and verify. Fails with `BrokenChain` if the parsed links do
    /// not form an intact chain.
    fn deserialize(&self, text: &str) -> Result<SimpleBlockchain> {
        self.decode_model(text)?.into_chain()
    }

    /// Parse without verifying link integrity, for inspecting damaged chains.
    fn deserialize_unverified(&self, text: &str) -> Result<SimpleBlockchain> {
        self.decode_model(text)?.into_chain_unverified()
    }
}
