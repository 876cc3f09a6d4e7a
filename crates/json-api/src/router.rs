//! App Router

use salvo::Router;

use crate::{auth, healthcheck, jobs, profile};

/// Every documented route, under `/api`.
pub(crate) fn app_router() -> Router {
    Router::with_path("api")
        .push(Router::with_path("health").get(healthcheck::handler))
        .push(
            Router::with_path("auth")
                .push(Router::with_path("login").post(auth::login::handler))
                .push(Router::with_path("register").post(auth::register::handler)),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("jobs")
                        .get(jobs::index::handler)
                        .post(jobs::create::handler)
                        .push(Router::with_path("{job}").get(jobs::get::handler)),
                )
                .push(Router::with_path("profile").get(profile::handler)),
        )
}
