//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie is private (encrypted and signed) and carries only the
//! authenticated user's id. Handlers turn it into a [`CallerToken`]; the
//! domain resolves that token on every call.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{CallerToken, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.get())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Token for the caller. Missing or unreadable sessions yield the
    /// anonymous token, which the domain rejects as unauthenticated.
    pub fn caller_token(&self) -> CallerToken {
        match self.0.get::<i32>(USER_ID_KEY) {
            Ok(Some(raw)) => CallerToken::new(raw),
            Ok(None) => CallerToken::anonymous(),
            Err(error) => {
                warn!(%error, "unreadable user id in session cookie");
                CallerToken::anonymous()
            }
        }
    }

    /// Drop the session and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/token",
                web::get().to(|session: SessionContext| async move {
                    HttpResponse::Ok().body(session.caller_token().to_string())
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = test::init_service(session_test_app().route(
            "/set",
            web::get().to(|session: SessionContext| async move {
                let id = UserId::new(42).expect("fixture id");
                session.persist_user(id)?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/token")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, "42");
    }

    #[actix_web::test]
    async fn missing_session_yields_anonymous_token() {
        let app = test::init_service(session_test_app()).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/token").to_request()).await;
        let body = test::read_body(res).await;
        assert_eq!(body, "0");
    }

    #[actix_web::test]
    async fn tampered_user_id_yields_anonymous_token() {
        let app = test::init_service(session_test_app().route(
            "/set-invalid",
            web::get().to(|session: Session| async move {
                session
                    .insert(USER_ID_KEY, "not-a-number")
                    .expect("set invalid user id");
                HttpResponse::Ok()
            }),
        ))
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/token")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body = test::read_body(res).await;
        assert_eq!(body, "0");
    }
}
