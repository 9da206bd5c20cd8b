//! Shared tool schema helpers.

use crate::account::Address;
use crate::{Error, Result};
use schemars::{JsonSchema, Schema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input shared by every analysis tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AccountAddressInput {
    /// Account address, hex with `0x` prefix (short forms are left-padded)
    pub account_address: String,
}

impl AccountAddressInput {
    pub fn address(&self) -> Result<Address> {
        self.account_address.parse()
    }
}

/// JSON schema for a tool input type
pub fn input_schema<T: JsonSchema>() -> Value {
    let schema: Schema = schemars::schema_for!(T);
    schema.to_value()
}

/// Decode tool arguments, reporting bad shapes as invalid arguments
pub fn parse_input<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::InvalidArgument(format!("Invalid tool arguments: {}", e)))
}

/// Function-calling style description of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_address_schema_requires_address() {
        let schema = input_schema::<AccountAddressInput>();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["account_address"].is_object());
        assert_eq!(schema["required"], json!(["account_address"]));
    }

    #[test]
    fn test_parse_input_rejects_missing_and_unknown_fields() {
        let err = parse_input::<AccountAddressInput>(json!({})).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = parse_input::<AccountAddressInput>(json!({
            "account_address": "0x1",
            "extra": true
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_address_parsing() {
        let input: AccountAddressInput = parse_input(json!({ "account_address": "0x1" })).unwrap();
        assert_eq!(input.address().unwrap().to_string(), format!("0x{:0>64}", "1"));

        let input = AccountAddressInput {
            account_address: "not-hex".to_string(),
        };
        assert!(input.address().is_err());
    }
}
