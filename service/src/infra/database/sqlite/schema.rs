//! Database schema management.

use sqlx::Row as _;
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{
    self,
    sqlite::{self, Connection},
    Sqlite,
};

/// Statements creating the tables, if they don't exist yet.
const CREATE_TABLES: &str = "\
    CREATE TABLE IF NOT EXISTS users (\
        id INTEGER PRIMARY KEY AUTOINCREMENT, \
        login TEXT UNIQUE NOT NULL, \
        password TEXT NOT NULL, \
        role TEXT NOT NULL\
    ); \
    CREATE TABLE IF NOT EXISTS cars (\
        id INTEGER PRIMARY KEY AUTOINCREMENT, \
        make TEXT NOT NULL, \
        model TEXT NOT NULL, \
        year INTEGER NOT NULL, \
        price REAL NOT NULL, \
        description TEXT, \
        seller_login TEXT NOT NULL, \
        status TEXT DEFAULT 'ForSale', \
        buyer_login TEXT, \
        date_added TEXT, \
        purchase_date TEXT\
    );";

/// Optional `cars` columns, which may be absent in databases created by older
/// versions.
const OPTIONAL_CARS_COLUMNS: [(&str, &str); 2] =
    [("date_added", "TEXT"), ("purchase_date", "TEXT")];

impl<C: Connection> Sqlite<C> {
    /// Ensures the database contains all the tables and columns used by this
    /// crate.
    ///
    /// Only adds what is missing, never drops or changes existing data, so is
    /// safe to be called on every start.
    ///
    /// # Errors
    ///
    /// If failed to inspect or alter the database.
    pub async fn ensure_schema(&self) -> Result<(), Traced<database::Error>> {
        self.batch_exec(CREATE_TABLES)
            .await
            .map_err(tracerr::wrap!())?;

        let columns = self
            .query(sqlx::query("PRAGMA table_info(cars)"))
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)?;

        for (name, ty) in OPTIONAL_CARS_COLUMNS {
            if columns.iter().any(|c| c == name) {
                continue;
            }
            log::info!("adding missing `cars.{name}` column");
            self.batch_exec(&format!("ALTER TABLE cars ADD COLUMN {name} {ty}"))
                .await
                .map_err(tracerr::wrap!())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use sqlx::Row as _;

    use crate::infra::database::sqlite::{Connection as _, Sqlite};

    async fn cars_columns(db: &Sqlite) -> Vec<String> {
        db.query(sqlx::query("PRAGMA table_info(cars)"))
            .await
            .unwrap()
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect()
    }

    #[tokio::test]
    async fn creates_tables() {
        let db = Sqlite::in_memory().unwrap();

        db.ensure_schema().await.unwrap();

        let columns = cars_columns(&db).await;
        assert!(columns.iter().any(|c| c == "buyer_login"));
        assert!(columns.iter().any(|c| c == "date_added"));
        assert!(columns.iter().any(|c| c == "purchase_date"));
        assert_eq!(
            db.query(sqlx::query("SELECT * FROM users")).await.unwrap().len(),
            0,
        );
    }

    #[tokio::test]
    async fn is_idempotent() {
        let db = Sqlite::in_memory().unwrap();

        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();

        assert_eq!(cars_columns(&db).await.len(), 11);
    }

    #[tokio::test]
    async fn adds_missing_columns_to_legacy_table() {
        let db = Sqlite::in_memory().unwrap();
        db.batch_exec(
            "CREATE TABLE cars (\
                id INTEGER PRIMARY KEY AUTOINCREMENT, \
                make TEXT NOT NULL, \
                model TEXT NOT NULL, \
                year INTEGER NOT NULL, \
                price REAL NOT NULL, \
                description TEXT, \
                seller_login TEXT NOT NULL, \
                status TEXT DEFAULT 'ForSale', \
                buyer_login TEXT\
            ); \
            INSERT INTO cars (make, model, year, price, seller_login) \
            VALUES ('Lada', 'Niva', 1990, 1500.0, 'seller');",
        )
        .await
        .unwrap();

        db.ensure_schema().await.unwrap();

        let columns = cars_columns(&db).await;
        assert!(columns.iter().any(|c| c == "date_added"));
        assert!(columns.iter().any(|c| c == "purchase_date"));
        let rows = db
            .query(sqlx::query("SELECT make, date_added FROM cars"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<String, _>("make"), "Lada");
        assert_eq!(rows[0].get::<Option<String>, _>("date_added"), None);
    }

    #[tokio::test]
    async fn defaults_status_to_for_sale() {
        let db = Sqlite::in_memory().unwrap();
        db.ensure_schema().await.unwrap();

        db.batch_exec(
            "INSERT INTO cars (make, model, year, price, seller_login) \
             VALUES ('Lada', 'Niva', 1990, 1500.0, 'seller');",
        )
        .await
        .unwrap();

        let rows = db
            .query(sqlx::query("SELECT status FROM cars"))
            .await
            .unwrap();
        assert_eq!(
            rows[0].get::<String, _>("status"),
            crate::domain::listing::Status::ForSale.tag(),
        );
        assert_eq!(rows[0].get::<String, _>("status"), "ForSale");
    }
}
