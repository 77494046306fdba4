//! Content type to handler bindings.

use crate::handler::{IntoHandlerResult, RequestHandler, TypedRequestHandler, UntypedRequestHandler};
use crate::RegistryError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use telemetry_types::{ContentArgs, ContentType, InboundRequest};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Holds at most one handler per content type.
///
/// Registration is expected to finish before traffic is served, but the map
/// is guarded so late registrations are still safe. Registering a second
/// handler for a type replaces the first; use [`HandlerRegistry::register_strict`]
/// to refuse duplicates instead.
pub struct HandlerRegistry<C>
where
    C: Send + Sync + 'static,
{
    handlers: RwLock<HashMap<ContentType, Arc<dyn RequestHandler<C>>>>,
}

impl<C> HandlerRegistry<C>
where
    C: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler that receives the precisely-typed payload of `A`.
    ///
    /// The content type is taken from `A::CONTENT_TYPE`, so a handler can
    /// never be bound to a type whose arguments it cannot read. Any earlier
    /// handler for that type is replaced.
    ///
    /// # Type Parameters
    ///
    /// * `A` - The payload type, which fixes the content type
    /// * `F` - Handler function taking the shared context and the typed request
    /// * `R` - What the handler resolves to; see [`IntoHandlerResult`]
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// registry.on(|ctx: Arc<ServerState>, req: InboundRequest<PlayerChatArgs>| async move {
    ///     ctx.record_chat(&req.args.player, &req.args.message);
    ///     Response::ok(req, "OK")
    /// }).await;
    /// ```
    pub async fn on<A, F, Fut, R>(&self, handler: F)
    where
        A: ContentArgs,
        F: Fn(Arc<C>, InboundRequest<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + Send + 'static,
    {
        let name = format!("{}::{}", A::CONTENT_TYPE, std::any::type_name::<A>());
        self.insert(Arc::new(TypedRequestHandler::<A, F>::new(name, handler)))
            .await;
    }

    /// Registers a handler for `content_type` that receives the untyped union.
    pub async fn register<F, Fut, R>(&self, content_type: ContentType, handler: F)
    where
        F: Fn(Arc<C>, InboundRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + Send + 'static,
    {
        let name = format!("{}::untyped", content_type);
        self.insert(Arc::new(UntypedRequestHandler::new(name, content_type, handler)))
            .await;
    }

    /// Like [`HandlerRegistry::register`], but fails if `content_type` already has a handler.
    ///
    /// # Returns
    ///
    /// `Ok(())` once bound, or [`RegistryError::DuplicateHandler`] leaving the
    /// existing binding untouched.
    pub async fn register_strict<F, Fut, R>(
        &self,
        content_type: ContentType,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Arc<C>, InboundRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + Send + 'static,
    {
        let name = format!("{}::untyped", content_type);
        let handler: Arc<dyn RequestHandler<C>> =
            Arc::new(UntypedRequestHandler::new(name, content_type, handler));

        let mut handlers = self.handlers.write().await;
        if handlers.contains_key(&content_type) {
            return Err(RegistryError::DuplicateHandler(content_type));
        }
        info!("📝 Registered handler {} for {}", handler.handler_name(), content_type);
        handlers.insert(content_type, handler);
        Ok(())
    }

    /// Stores `handler` under its own content type.
    ///
    /// The binding is in place before the registration is logged.
    ///
    /// # Arguments
    ///
    /// * `handler` - Any [`RequestHandler`], typically one built outside the
    ///   closure-based helpers
    ///
    /// # Returns
    ///
    /// The handler previously bound to the same content type, if any.
    pub async fn insert(
        &self,
        handler: Arc<dyn RequestHandler<C>>,
    ) -> Option<Arc<dyn RequestHandler<C>>> {
        let content_type = handler.content_type();
        let name = handler.handler_name().to_string();

        let previous = self.handlers.write().await.insert(content_type, handler);
        info!("📝 Registered handler {} for {}", name, content_type);
        if let Some(previous) = &previous {
            debug!("Replaced handler {} for {}", previous.handler_name(), content_type);
        }
        previous
    }

    /// The handler bound to `content_type`, cloned out so the lock is not held
    /// while it runs.
    pub async fn lookup(&self, content_type: ContentType) -> Option<Arc<dyn RequestHandler<C>>> {
        self.handlers.read().await.get(&content_type).cloned()
    }

    /// Content types that currently have a handler, in declaration order.
    pub async fn registered_types(&self) -> Vec<ContentType> {
        let handlers = self.handlers.read().await;
        let mut types: Vec<ContentType> = handlers.keys().copied().collect();
        types.sort();
        types
    }

    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

impl<C> Default for HandlerRegistry<C>
where
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for HandlerRegistry<C>
where
    C: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &"[handlers]")
            .finish()
    }
}
