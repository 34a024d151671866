//! [`Command`] for authorizing a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::{errors::ErrorKind as JwtErrorKind, Validation};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its [`session::Token`].
///
/// Succeeds only if the [`session::Token`] is valid, not expired yet, and the
/// [`User`] it was issued for still exists.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            JwtErrorKind::ExpiredSignature => tracerr::new!(E::Expired),
            _ => tracerr::new!(E::JsonWebTokenDecodeError(e)),
        })?
        .claims;

        drop(
            self.database()
                .execute(Select(By::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Session`] has expired.
    #[display("`Session` has expired")]
    Expired,

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::{
        command::{
            authorize_user_session::ExecutionError, fixture::Users,
            AuthorizeUserSession, CreateUserSession, DeleteUser,
        },
        domain::user::{session, Session},
        Command as _, Service,
    };

    #[tokio::test]
    async fn rejects_malformed_token() {
        let svc = Service::in_memory().await;

        let err = svc
            .execute(AuthorizeUserSession {
                token: "not.a.token".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::JsonWebTokenDecodeError(_)),
            "unexpected error: {err}",
        );
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let svc = Service::in_memory().await;
        let Users { buyer, .. } = Users::create(&svc).await;

        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: buyer.id,
                expires_at: (DateTime::UNIX_EPOCH + Duration::from_secs(60))
                    .coerce(),
            },
            &svc.config().jwt_encoding_key,
        )
        .unwrap();

        let err = svc
            .execute(AuthorizeUserSession {
                token: token.parse::<session::Token>().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::Expired),
            "unexpected error: {err}",
        );
    }

    #[tokio::test]
    async fn rejects_session_of_deleted_user() {
        let svc = Service::in_memory().await;
        let Users { admin, buyer, .. } = Users::create(&svc).await;
        let out = svc
            .execute(CreateUserSession::ByUserId(buyer.id))
            .await
            .unwrap();

        svc.execute(DeleteUser {
            requester: admin.id,
            target: buyer.id,
        })
        .await
        .unwrap();
        let err = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::UserNotExists(id) if *id == buyer.id),
            "unexpected error: {err}",
        );
    }
}
