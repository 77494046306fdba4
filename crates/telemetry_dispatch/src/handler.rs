//! Handler abstraction and the adapters that wrap user closures.

use crate::HandlerError;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use telemetry_types::{ContentArgs, ContentType, InboundRequest, Response};

/// What a handler settles to, after conversion.
///
/// `Ok(None)` means the handler resolved without a response, which the
/// dispatcher treats as a contract violation.
pub type HandlerResult = Result<Option<Response>, HandlerError>;

/// Return types a handler closure may use.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for Response {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl IntoHandlerResult for Option<Response> {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoHandlerResult for Result<Response, HandlerError> {
    fn into_handler_result(self) -> HandlerResult {
        self.map(Some)
    }
}

/// A handler bound to one content type.
#[async_trait]
pub trait RequestHandler<C>: Send + Sync
where
    C: Send + Sync + 'static,
{
    async fn handle(&self, context: Arc<C>, request: InboundRequest) -> HandlerResult;
    fn content_type(&self) -> ContentType;
    fn handler_name(&self) -> &str;
}

/// Wraps a closure that receives the precisely-typed payload for `A`.
pub struct TypedRequestHandler<A, F> {
    handler: F,
    name: String,
    _phantom: PhantomData<fn() -> A>,
}

impl<A, F> TypedRequestHandler<A, F>
where
    A: ContentArgs,
{
    pub fn new(name: String, handler: F) -> Self {
        Self {
            handler,
            name,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<C, A, F, Fut, R> RequestHandler<C> for TypedRequestHandler<A, F>
where
    C: Send + Sync + 'static,
    A: ContentArgs,
    F: Fn(Arc<C>, InboundRequest<A>) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send,
    R: IntoHandlerResult + Send,
{
    async fn handle(&self, context: Arc<C>, request: InboundRequest) -> HandlerResult {
        let request = request.into_typed::<A>().map_err(|request| {
            HandlerError::new(format!(
                "{} received {} arguments",
                self.name,
                request.args.content_type()
            ))
        })?;
        (self.handler)(context, request).await.into_handler_result()
    }

    fn content_type(&self) -> ContentType {
        A::CONTENT_TYPE
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Wraps a closure that receives the tagged [`telemetry_types::RequestArgs`] union.
pub struct UntypedRequestHandler<F> {
    handler: F,
    content_type: ContentType,
    name: String,
}

impl<F> UntypedRequestHandler<F> {
    pub fn new(name: String, content_type: ContentType, handler: F) -> Self {
        Self {
            handler,
            content_type,
            name,
        }
    }
}

#[async_trait]
impl<C, F, Fut, R> RequestHandler<C> for UntypedRequestHandler<F>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, InboundRequest) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send,
    R: IntoHandlerResult + Send,
{
    async fn handle(&self, context: Arc<C>, request: InboundRequest) -> HandlerResult {
        (self.handler)(context, request).await.into_handler_result()
    }

    fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}
