//! Error fan-out for failures raised outside the resolvers
//!
//! Parse and validation failures never reach a resolver, so the service
//! never sees them. This extension tags them `INVALID_REQUEST` and reports
//! them on the errors topic like any handler failure.

use std::sync::Arc;

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextRequest, NextSubscribe,
};
use async_graphql::Response;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::ChatServiceError;
use crate::service::ChatService;

/// Schema extension reporting uncoded errors on `onError`
pub struct ErrorFanOut;

impl ExtensionFactory for ErrorFanOut {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(ErrorFanOutExtension)
    }
}

struct ErrorFanOutExtension;

#[async_trait::async_trait]
impl Extension for ErrorFanOutExtension {
    async fn request(&self, ctx: &ExtensionContext<'_>, next: NextRequest<'_>) -> Response {
        let mut response = next.run(ctx).await;
        if let Some(service) = ctx.data_opt::<Arc<ChatService>>() {
            report_uncoded(service, &mut response);
        }
        response
    }

    fn subscribe<'s>(
        &self,
        ctx: &ExtensionContext<'_>,
        stream: BoxStream<'s, Response>,
        next: NextSubscribe<'_>,
    ) -> BoxStream<'s, Response> {
        let service = ctx.data_opt::<Arc<ChatService>>().cloned();
        next.run(ctx, stream)
            .map(move |mut response| {
                if let Some(service) = &service {
                    report_uncoded(service, &mut response);
                }
                response
            })
            .boxed()
    }
}

/// Errors carrying a `code` came from the service and were reported there
fn report_uncoded(service: &ChatService, response: &mut Response) {
    for err in &mut response.errors {
        let extensions = err.extensions.get_or_insert_with(Default::default);
        if extensions.get("code").is_some() {
            continue;
        }
        let reported = ChatServiceError::invalid_request(err.message.clone());
        extensions.set("code", reported.code());
        service.report(&reported, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::ChatEvents;
    use crate::schema::build_schema;
    use crate::store::MemoryStore;

    fn setup() -> (crate::schema::ChatSchema, Arc<ChatService>) {
        let service = Arc::new(ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new()));
        (build_schema(service.clone()), service)
    }

    #[tokio::test]
    async fn test_validation_error_is_coded_and_reported() {
        let (schema, service) = setup();
        let mut errors = service.subscribe_errors();

        let response = schema
            .execute(r#"mutation { sendMessage(input: { content: "hi" }) { id } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        let json = serde_json::to_value(&response.errors[0]).unwrap();
        assert_eq!(json["extensions"]["code"], "INVALID_REQUEST");

        let reported = errors.try_recv().unwrap();
        assert_eq!(reported.code, "INVALID_REQUEST");
        assert_eq!(reported.conversation_id, None);
        assert!(errors.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_service_errors_are_reported_once() {
        let (schema, service) = setup();
        let mut errors = service.subscribe_errors();

        let response = schema
            .execute(r#"mutation { sendMessage(input: { content: "hi", conversationId: "ghost" }) { id } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);

        assert_eq!(errors.try_recv().unwrap().code, "CONVERSATION_NOT_FOUND");
        assert!(errors.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_invalid_subscription_is_reported() {
        let (schema, service) = setup();
        let mut errors = service.subscribe_errors();

        let mut stream = schema.execute_stream("subscription { nope }");
        let response = stream.next().await.unwrap();
        assert!(response.is_err());
        assert_eq!(errors.try_recv().unwrap().code, "INVALID_REQUEST");
    }
}
