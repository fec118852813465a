//! Contract execution port.
//!
//! The degree workflow never decides eligibility itself. It sends a JSON
//! message to an external contract through [`ContractExecutor`] and treats
//! the response as authoritative.

use academic_ledger_core::Address;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Funds attached to a contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// Failure reported by the contract engine, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExecutionError(pub String);

/// Executes a message against a deployed contract.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ContractExecutor: Send + Sync {
    /// Run `payload` on `contract` on behalf of `caller`, returning the raw
    /// response bytes.
    async fn execute(
        &self,
        contract: &str,
        caller: &Address,
        payload: Bytes,
        funds: Vec<Coin>,
    ) -> std::result::Result<Bytes, ExecutionError>;
}

/// A scripted executor for tests.
///
/// Responses are keyed by message name (the single top-level key of the
/// JSON envelope) and every call is recorded.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// One recorded contract call.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ExecutedCall {
        pub contract: String,
        pub caller: Address,
        pub message: String,
        pub payload: serde_json::Value,
    }

    #[derive(Debug, Clone)]
    enum Scripted {
        Reply(Bytes),
        Fail(String),
    }

    #[derive(Default)]
    pub struct MockContractExecutor {
        script: Mutex<HashMap<String, Scripted>>,
        calls: Mutex<Vec<ExecutedCall>>,
    }

    impl MockContractExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer every `message` call with this JSON value.
        pub async fn respond(&self, message: &str, response: serde_json::Value) {
            self.respond_raw(message, response.to_string().into_bytes()).await;
        }

        /// Answer every `message` call with these exact bytes.
        pub async fn respond_raw(&self, message: &str, response: impl Into<Bytes>) {
            self.script
                .lock()
                .await
                .insert(message.to_string(), Scripted::Reply(response.into()));
        }

        /// Fail every `message` call with this error.
        pub async fn fail(&self, message: &str, error: &str) {
            self.script
                .lock()
                .await
                .insert(message.to_string(), Scripted::Fail(error.to_string()));
        }

        pub async fn calls(&self) -> Vec<ExecutedCall> {
            self.calls.lock().await.clone()
        }

        pub async fn call_count(&self, message: &str) -> usize {
            self.calls
                .lock()
                .await
                .iter()
                .filter(|c| c.message == message)
                .count()
        }
    }

    #[async_trait]
    impl ContractExecutor for MockContractExecutor {
        async fn execute(
            &self,
            contract: &str,
            caller: &Address,
            payload: Bytes,
            _funds: Vec<Coin>,
        ) -> std::result::Result<Bytes, ExecutionError> {
            let payload: serde_json::Value = serde_json::from_slice(&payload)
                .map_err(|e| ExecutionError(format!("invalid payload: {e}")))?;
            let message = payload
                .as_object()
                .and_then(|o| o.keys().next())
                .cloned()
                .unwrap_or_default();

            self.calls.lock().await.push(ExecutedCall {
                contract: contract.to_string(),
                caller: caller.clone(),
                message: message.clone(),
                payload,
            });

            match self.script.lock().await.get(&message) {
                Some(Scripted::Reply(bytes)) => Ok(bytes.clone()),
                Some(Scripted::Fail(error)) => Err(ExecutionError(error.clone())),
                None => Err(ExecutionError(format!("no response scripted for {message}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockContractExecutor;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_routes_by_message_name() {
        let mock = MockContractExecutor::new();
        mock.respond("request_degree", json!({"degree_request_id": "dr-1", "status": "pending"}))
            .await;
        mock.fail("issue_degree", "insufficient credits").await;

        let caller = Address::new("cosmos1alice");
        let ok = mock
            .execute("cosmos1contract", &caller, Bytes::from_static(br#"{"request_degree":{}}"#), vec![])
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&ok).contains("dr-1"));

        let err = mock
            .execute("cosmos1contract", &caller, Bytes::from_static(br#"{"issue_degree":{}}"#), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "insufficient credits");

        let calls = mock.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].message, "request_degree");
        assert_eq!(mock.call_count("issue_degree").await, 1);
    }

    #[tokio::test]
    async fn test_unscripted_message_fails() {
        let mock = MockContractExecutor::new();
        let result = mock
            .execute(
                "cosmos1contract",
                &Address::new("cosmos1alice"),
                Bytes::from_static(br#"{"cancel_degree_request":{}}"#),
                vec![],
            )
            .await;
        assert!(result.is_err());
    }
}
