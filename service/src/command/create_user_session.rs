//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Login, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Login`] of a [`User`].
        login: user::Login,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { login, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&login)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                if &user.password != password.expose_secret() {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let expires_at =
            (DateTime::now() + self.config().session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{
            create_user_session::ExecutionError, AuthorizeUserSession,
            CreateUser, CreateUserSession,
        },
        domain::user,
        Command as _, Service,
    };

    fn login(s: &str) -> user::Login {
        user::Login::new(s).unwrap()
    }

    fn password(s: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(s).unwrap()))
    }

    async fn service_with_user() -> (Service<crate::infra::Sqlite>, user::User) {
        let svc = Service::in_memory().await;
        let user = svc
            .execute(CreateUser {
                login: login("alice"),
                password: password("Secret1"),
                role: user::Role::Buyer,
            })
            .await
            .unwrap();
        (svc, user)
    }

    #[tokio::test]
    async fn authenticates_registered_user() {
        let (svc, registered) = service_with_user().await;

        let out = svc
            .execute(CreateUserSession::ByCredentials {
                login: login("alice"),
                password: password("Secret1"),
            })
            .await
            .unwrap();

        assert_eq!(out.user.id, registered.id);
        assert_eq!(out.user.role, user::Role::Buyer);

        let session = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(session.user_id, registered.id);
        assert_eq!(session.expires_at, out.expires_at);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let (svc, _) = service_with_user().await;

        for wrong in ["secret1", "Secret", "Secret12"] {
            let err = svc
                .execute(CreateUserSession::ByCredentials {
                    login: login("alice"),
                    password: password(wrong),
                })
                .await
                .unwrap_err();

            assert!(
                matches!(err.as_ref(), ExecutionError::WrongCredentials),
                "unexpected error: {err}",
            );
        }
    }

    #[tokio::test]
    async fn rejects_unknown_login() {
        let (svc, _) = service_with_user().await;

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                login: login("bob"),
                password: password("Secret1"),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::WrongCredentials),
            "unexpected error: {err}",
        );
    }

    #[tokio::test]
    async fn creates_session_by_user_id() {
        let (svc, registered) = service_with_user().await;

        let out = svc
            .execute(CreateUserSession::ByUserId(registered.id))
            .await
            .unwrap();
        assert_eq!(out.user.login, registered.login);

        let err = svc
            .execute(CreateUserSession::ByUserId(user::Id::from(999)))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::UserNotExists(_)),
            "unexpected error: {err}",
        );
    }
}
