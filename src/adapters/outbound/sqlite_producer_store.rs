//! SQLite Producer Store
//!
//! Implements ProducerStore using a local SQLite file, the row-oriented
//! representation. Products collapse to a single ", "-joined text column;
//! per-product photos cannot be stored in this representation.

use crate::domain::entities::{NewProducer, Producer, Product, ProfileUpdate};
use crate::domain::ports::{ProducerStore, StoreError};
use crate::domain::value_objects::{Coordinates, ProducerId};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Fixed dataset inserted when the database file is created from scratch,
/// so a fresh install renders a non-empty map.
const SEED_PRODUCERS: &[(&str, f64, f64, &str, &str, &str)] = &[
    (
        "Quinta do Vale Verde",
        39.2362,
        -8.6868,
        "Tomates, Alfaces, Morangos",
        "Rua das Flores 12, Santarém",
        "+351 912 345 678",
    ),
    (
        "Horta da Maria",
        38.0151,
        -7.8632,
        "Ovos, Queijo de Cabra",
        "Monte da Azinheira, Beja",
        "+351 965 432 109",
    ),
];

/// SQLite-backed producer store.
///
/// Every operation opens its own connection inside `spawn_blocking`; the
/// service holds no connection state across requests.
pub struct SqliteProducerStore {
    db_path: String,
}

impl SqliteProducerStore {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Create the schema, seeding the table when the database file did not
    /// previously exist.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let fresh = !Path::new(&self.db_path).exists();
        self.with_conn(move |conn| {
            Self::setup_schema(&conn).map_err(db_err)?;
            if fresh {
                Self::seed(&conn).map_err(db_err)?;
                tracing::info!("seeded fresh producer database");
            }
            Ok(())
        })
        .await
    }

    fn setup_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS produtores (
                id_produtor INTEGER PRIMARY KEY AUTOINCREMENT,
                nome_produtor TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                produtos_venda TEXT,
                morada TEXT NOT NULL,
                telefone TEXT,
                email TEXT,
                password TEXT,
                disponivel INTEGER NOT NULL DEFAULT 1,
                foto TEXT
            );",
        )
    }

    fn seed(conn: &Connection) -> rusqlite::Result<()> {
        let mut stmt = conn.prepare(
            "INSERT INTO produtores
                (nome_produtor, latitude, longitude, produtos_venda, morada, telefone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (nome, lat, lng, produtos, morada, telefone) in SEED_PRODUCERS {
            stmt.execute(params![nome, lat, lng, produtos, morada, telefone])?;
        }
        Ok(())
    }

    /// Convert a SQLite row to a Producer entity.
    fn row_to_producer(row: &Row) -> rusqlite::Result<Producer> {
        let produtos_venda: Option<String> = row.get(4)?;
        Ok(Producer {
            id: ProducerId::from_rowid(row.get(0)?),
            name: row.get(1)?,
            coordinates: Coordinates::new(row.get(2)?, row.get(3)?),
            products: split_product_names(produtos_venda.as_deref().unwrap_or_default()),
            address: row.get(5)?,
            phone: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            email: row.get(7)?,
            password: row.get(8)?,
            available: row.get::<_, i64>(9)? != 0,
            photo: row.get(10)?,
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(db_err)?;
            f(conn)
        })
        .await
        .map_err(|e| StoreError::Backend(anyhow::anyhow!("blocking task failed: {e}")))?
    }
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.into())
}

/// Collapse structured products into the stored text column. Photo
/// associations are lost; this direction is lossy.
fn join_product_names(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Re-expand the stored text column, wrapping each name into a product
/// with an empty photo URL so the output shape matches the document
/// representation.
fn split_product_names(joined: &str) -> Vec<Product> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Product::named)
        .collect()
}

const SELECT_COLUMNS: &str = "id_produtor, nome_produtor, latitude, longitude, \
     produtos_venda, morada, telefone, email, password, disponivel, foto";

#[async_trait]
impl ProducerStore for SqliteProducerStore {
    async fn create(&self, producer: NewProducer) -> Result<ProducerId, StoreError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO produtores
                    (nome_produtor, morada, telefone, produtos_venda,
                     latitude, longitude, email, password, disponivel, foto)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, NULL)",
                params![
                    producer.name,
                    producer.address,
                    producer.phone,
                    join_product_names(&producer.products),
                    producer.coordinates.latitude,
                    producer.coordinates.longitude,
                    producer.email,
                    producer.password,
                ],
            )
            .map_err(db_err)?;
            Ok(ProducerId::from_rowid(conn.last_insert_rowid()))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Producer>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM produtores ORDER BY id_produtor"
                ))
                .map_err(db_err)?;
            let producers = stmt
                .query_map([], |row| Self::row_to_producer(row))
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(producers)
        })
        .await
    }

    async fn find_by_id(&self, id: &ProducerId) -> Result<Option<Producer>, StoreError> {
        // Identifiers from the other representation can never match rows.
        let Some(rowid) = id.as_rowid() else {
            return Ok(None);
        };
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM produtores WHERE id_produtor = ?1"),
                params![rowid],
                |row| Self::row_to_producer(row),
            )
            .optional()
            .map_err(db_err)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Producer>, StoreError> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM produtores WHERE email = ?1 \
                     ORDER BY id_produtor LIMIT 1"
                ),
                params![email],
                |row| Self::row_to_producer(row),
            )
            .optional()
            .map_err(db_err)
        })
        .await
    }

    async fn update_profile(
        &self,
        id: &ProducerId,
        update: ProfileUpdate,
    ) -> Result<(), StoreError> {
        let Some(rowid) = id.as_rowid() else {
            return Err(StoreError::NotFound);
        };
        self.with_conn(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE produtores
                     SET nome_produtor = ?1, telefone = ?2, produtos_venda = ?3,
                         disponivel = ?4, foto = ?5
                     WHERE id_produtor = ?6",
                    params![
                        update.name,
                        update.phone,
                        join_product_names(&update.products),
                        update.available as i64,
                        update.photo,
                        rowid,
                    ],
                )
                .map_err(db_err)?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }
}
