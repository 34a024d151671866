//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::{self, user::session},
    query, Query as _,
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::User;
use crate::{api, define_error, AsError, Error, JuniperResponse, Service};

/// Per-request application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// [`session::Token`] provided in the `Authorization` header of the
    /// request, if any.
    bearer: Result<Option<session::Token>, Error>,

    /// Current [`Session`].
    current_session: OnceCell<Session>,

    /// [`Error`] the [`Session`] authentication failed with.
    auth_error: OnceCell<Error>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Sets the current [`Session`] for this [`Context`].
    ///
    /// Does nothing if the current [`Session`] is already known.
    pub async fn set_current_session(&self, session: Session) {
        _ = self
            .current_session
            .get_or_init(|| async move { session })
            .await;
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// The authentication happens once per request, and its outcome is reused
    /// by all the resolvers.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid or expired;
    /// - the [`User`] the token was issued for doesn't exist anymore.
    pub async fn current_session(&self) -> Result<Session, Error> {
        if let Some(err) = self.auth_error.get() {
            return Err(err.clone());
        }

        let res = self
            .current_session
            .get_or_try_init(|| self.authenticate())
            .await
            .cloned();
        if let Err(e) = &res {
            _ = self.auth_error.set(e.clone());
        }
        res
    }

    /// Returns the [`domain::User`] of the current [`Session`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid;
    /// - the [`domain::User`] has been deleted since the [`Session`] creation.
    pub async fn current_user(&self) -> Result<domain::User, Error> {
        let my_id = self.current_session().await?.user_id;
        self.service
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(self.error())?
            .ok_or_else(|| AuthError::AuthorizationRequired.into())
            .map_err(self.error())
    }

    /// Authenticates the [`Session`] by the bearer [`session::Token`].
    ///
    /// # Errors
    ///
    /// Errors if the bearer [`session::Token`] is absent or invalid.
    async fn authenticate(&self) -> Result<Session, Error> {
        let res = match self.bearer.clone() {
            Ok(Some(token)) => self
                .service
                .execute(command::AuthorizeUserSession {
                    token: token.clone(),
                })
                .await
                .map(|s| Session {
                    user_id: s.user_id.into(),
                    token,
                    expires_at: s.expires_at.coerce(),
                })
                .map_err(AsError::into_error),
            Ok(None) => Err(AuthError::AuthorizationRequired.into()),
            Err(e) => Err(e),
        };
        res.map_err(self.error())
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        let bearer = match parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                let token = unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                };
                Ok(Some(token))
            }
            Err(e) if e.is_missing() => Ok(None),
            Err(e) => Err(e.into_error()),
        };

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            bearer,
            current_session: OnceCell::new(),
            auth_error: OnceCell::new(),
        })
    }
}

/// Signed-in user session.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the [`User`] associated with this [`Session`].
    pub user_id: api::user::Id,

    /// Authentication token.
    pub token: session::Token,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Expired
            | Self::JsonWebTokenDecodeError(_)
            | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}
