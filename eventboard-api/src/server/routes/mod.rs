use crate::server::ServerRouter;
use axum::Router;

mod events;

pub fn routes() -> ServerRouter {
    Router::new().merge(events::routes())
}
