//! Error taxonomy for chat operations
//!
//! Domain failures (`ConversationNotFound`, `ModelNotSupported`) are expected
//! outcomes and carry a stable code. Everything the caller cannot act on
//! collapses into `Internal`.

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::models::CompletionError;
use crate::publisher::PublishError;
use crate::store::StoreError;
use crate::types::ChatError;

/// Message shown to clients in place of internal fault details
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// Errors raised by chat handlers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatServiceError {
    #[error("Conversation '{conversation_id}' not found")]
    ConversationNotFound { conversation_id: String },

    #[error("Model '{model}' is not supported")]
    ModelNotSupported { model: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ChatResult<T> = Result<T, ChatServiceError>;

impl ChatServiceError {
    pub fn conversation_not_found(conversation_id: impl Into<String>) -> Self {
        Self::ConversationNotFound {
            conversation_id: conversation_id.into(),
        }
    }

    pub fn model_not_supported(model: impl Into<String>) -> Self {
        Self::ModelNotSupported {
            model: model.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConversationNotFound { .. } => "CONVERSATION_NOT_FOUND",
            Self::ModelNotSupported { .. } => "MODEL_NOT_SUPPORTED",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Authentication(_) => "UNAUTHENTICATED",
            Self::Authorization(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Conversation the error refers to, when the error itself names one
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            Self::ConversationNotFound { conversation_id } => Some(conversation_id),
            _ => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Message safe to hand to a client
    pub fn public_message(&self, expose_internal: bool) -> String {
        if self.is_internal() && !expose_internal {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Notification published on the errors topic
    pub fn to_chat_error(&self, expose_internal: bool, context: Option<&str>) -> ChatError {
        let error = ChatError::new(self.public_message(expose_internal), self.code());
        match self.conversation_id().or(context) {
            Some(conversation_id) => error.with_conversation(conversation_id),
            None => error,
        }
    }

    /// GraphQL error carrying `code` and `conversationId` extensions
    pub fn to_graphql(&self, expose_internal: bool, context: Option<&str>) -> async_graphql::Error {
        let code = self.code();
        let conversation_id = self.conversation_id().or(context).map(str::to_string);
        async_graphql::Error::new(self.public_message(expose_internal)).extend_with(|_, ext| {
            ext.set("code", code);
            if let Some(conversation_id) = conversation_id {
                ext.set("conversationId", conversation_id);
            }
        })
    }
}

impl From<StoreError> for ChatServiceError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<PublishError> for ChatServiceError {
    fn from(err: PublishError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<CompletionError> for ChatServiceError {
    fn from(err: CompletionError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            ChatServiceError::conversation_not_found("c").code(),
            "CONVERSATION_NOT_FOUND"
        );
        assert_eq!(
            ChatServiceError::model_not_supported("m").code(),
            "MODEL_NOT_SUPPORTED"
        );
        assert_eq!(ChatServiceError::invalid_request("x").code(), "INVALID_REQUEST");
        assert_eq!(ChatServiceError::Internal("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_internal_details_masked_in_production() {
        let err = ChatServiceError::Internal("disk on fire".to_string());
        assert_eq!(err.public_message(false), INTERNAL_ERROR_MESSAGE);
        assert!(err.public_message(true).contains("disk on fire"));

        let domain = ChatServiceError::model_not_supported("gpt-9");
        assert!(domain.public_message(false).contains("gpt-9"));
    }

    #[test]
    fn test_chat_error_prefers_own_conversation_id() {
        let err = ChatServiceError::conversation_not_found("conv-1");
        let chat_error = err.to_chat_error(false, Some("other"));
        assert_eq!(chat_error.code, "CONVERSATION_NOT_FOUND");
        assert_eq!(chat_error.conversation_id.as_deref(), Some("conv-1"));

        let err = ChatServiceError::invalid_request("empty content");
        let chat_error = err.to_chat_error(false, Some("conv-2"));
        assert_eq!(chat_error.conversation_id.as_deref(), Some("conv-2"));
    }

    #[test]
    fn test_graphql_error_has_code_extension() {
        let err = ChatServiceError::model_not_supported("unknown-model");
        let gql = err.to_graphql(false, None);
        let ext = gql.extensions.expect("extensions set");
        assert_eq!(
            ext.get("code"),
            Some(&async_graphql::Value::from("MODEL_NOT_SUPPORTED"))
        );
    }
}
