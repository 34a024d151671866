//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use sqlx::Row as _;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            sqlite::{self, connection::Row, Connection},
            Sqlite,
        },
        Database,
    },
};

/// Builds a [`User`] out of the provided [`Row`].
fn from_row(row: &Row) -> Result<User, Traced<database::Error>> {
    let build = || -> Result<_, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            login: row.try_get("login")?,
            password: row.try_get("password")?,
            role: row.try_get("role")?,
        })
    };
    build()
        .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
        .map_err(tracerr::map_from)
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, password, role \
            FROM users \
            WHERE id = ?1";
        self.query_opt(sqlx::query(SQL).bind(id))
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
            .transpose()
            .map_err(tracerr::wrap!())
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Login>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, password, role \
            FROM users \
            WHERE login = ?1";
        self.query_opt(sqlx::query(SQL).bind(login))
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
            .transpose()
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<User>, ()>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, login, password, role \
            FROM users \
            ORDER BY id ASC";
        self.query(sqlx::query(SQL))
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect::<Result<_, _>>()
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<user::New>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::New {
            login,
            password,
            role,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (login, password, role) \
            VALUES (?1, ?2, ?3) \
            RETURNING id";
        let row = self
            .query_one(
                sqlx::query(SQL)
                    .bind(login.clone())
                    .bind(password.clone())
                    .bind(role),
            )
            .await
            .map_err(tracerr::wrap!())?;
        let id = row
            .try_get("id")
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)?;

        Ok(User {
            id,
            login,
            password,
            role,
        })
    }
}

impl<C> Database<Delete<By<User, user::Id>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM users \
            WHERE id = ?1";
        self.exec(sqlx::query(SQL).bind(id))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert, Select};

    use crate::{
        domain::{user, User},
        infra::{
            database::{sqlite::Connection as _, Sqlite},
            Database as _,
        },
    };

    async fn db() -> Sqlite {
        let db = Sqlite::in_memory().unwrap();
        db.ensure_schema().await.unwrap();
        db
    }

    fn new_user(login: &str, role: user::Role) -> user::New {
        user::New {
            login: user::Login::new(login).unwrap(),
            password: user::Password::new("pw").unwrap(),
            role,
        }
    }

    #[tokio::test]
    async fn inserts_and_selects() {
        let db = db().await;

        let inserted = db
            .execute(Insert(new_user("alice", user::Role::Seller)))
            .await
            .unwrap();

        let by_id = db
            .execute(Select(By::<Option<User>, _>::new(inserted.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id.login, inserted.login);
        assert_eq!(by_id.role, user::Role::Seller);

        let by_login = db
            .execute(Select(By::<Option<User>, _>::new(&inserted.login)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_login.id, inserted.id);
        assert_eq!(by_login.password, user::Password::new("pw").unwrap());
    }

    #[tokio::test]
    async fn rejects_duplicate_login() {
        let db = db().await;

        _ = db
            .execute(Insert(new_user("alice", user::Role::Seller)))
            .await
            .unwrap();
        let err = db
            .execute(Insert(new_user("alice", user::Role::Buyer)))
            .await
            .unwrap_err();

        assert!(err.into_inner().is_unique_violation());
    }

    #[tokio::test]
    async fn lists_by_id() {
        let db = db().await;
        for login in ["c", "a", "b"] {
            _ = db
                .execute(Insert(new_user(login, user::Role::Buyer)))
                .await
                .unwrap();
        }

        let users = db
            .execute(Select(By::<Vec<User>, _>::new(())))
            .await
            .unwrap();

        let logins = users.iter().map(|u| u.login.to_string()).collect::<Vec<_>>();
        assert_eq!(logins, ["c", "a", "b"]);
        assert!(users.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn deletes() {
        let db = db().await;
        let user = db
            .execute(Insert(new_user("alice", user::Role::Buyer)))
            .await
            .unwrap();

        db.execute(Delete(By::<User, _>::new(user.id))).await.unwrap();

        assert!(db
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn reads_legacy_localized_roles() {
        let db = db().await;
        db.batch_exec(
            "INSERT INTO users (login, password, role) \
             VALUES ('boss', 'pw', 'Админ'), \
                    ('dealer', 'pw', 'Продавец'), \
                    ('bob', 'pw', 'BUYER'), \
                    ('carl', 'pw', 'Покупатель');",
        )
        .await
        .unwrap();

        let users = db
            .execute(Select(By::<Vec<User>, _>::new(())))
            .await
            .unwrap();
        let roles = users.iter().map(|u| u.role).collect::<Vec<_>>();
        assert_eq!(
            roles,
            [
                user::Role::Admin,
                user::Role::Seller,
                user::Role::Buyer,
                user::Role::Buyer,
            ],
        );

        let boss = db
            .execute(Select(By::<Option<User>, _>::new(
                &user::Login::new("boss").unwrap(),
            )))
            .await
            .unwrap()
            .unwrap();
        assert!(boss.is_admin());
    }
}
