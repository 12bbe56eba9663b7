//! Test-double calldata codec.
//!
//! The real GenLayer calldata wire format is explicitly out of scope (§1);
//! this adapter stands in for it in tests and the demo binary by encoding
//! method calls as small JSON objects.

use crate::ports::outbound::CalldataCodec;

/// Encodes `{"method": name}` as calldata and decodes a bare JSON string
/// back out.
#[derive(Default)]
pub struct JsonCalldataCodec;

impl CalldataCodec for JsonCalldataCodec {
    fn encode_method_call(&self, method: &str) -> Vec<u8> {
        serde_json::json!({ "method": method }).to_string().into_bytes()
    }

    fn decode_as_string(&self, data: &[u8]) -> Option<String> {
        serde_json::from_slice::<serde_json::Value>(data)
            .ok()?
            .as_str()
            .map(str::to_string)
    }
}
