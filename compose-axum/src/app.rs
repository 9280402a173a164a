use axum::handler::Handler;
use axum::routing::get;
use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Router builder for a Compose server.
///
/// Routes are added with [`AxumApp::merge`] and [`AxumApp::service`];
/// [`AxumApp::into_router`] wraps everything in request-id and trace layers.
#[derive(Clone, Default)]
pub struct AxumApp {
    pub router: Router<()>,
}

impl AxumApp {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    pub fn merge(mut self, router: Router<()>) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn service<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    /// Final router: every response carries `x-request-id` (the caller's, or
    /// a fresh UUID) and every request is traced.
    pub fn into_router(self) -> Router<()> {
        self.router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}
