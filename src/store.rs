// ------------- Document store -------------
//
// SQLite backed provider. Every document is one row holding the collection it
// belongs to and its fields as JSON text. The connection is shared behind a
// mutex and all statements run on the blocking pool, so the async provider
// methods never stall the runtime.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{FactoryError, Result};
use crate::provider::{Document, Filter, Model, Provider};

const SCHEMA: &str = "
    create table if not exists Document (
        Document_Identity integer primary key autoincrement,
        Collection text not null,
        Body text not null
    );
    create index if not exists Document_by_Collection on Document (
        Collection
    );
";

#[derive(Debug, Clone)]
pub struct DocumentStore {
    connection: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    /// Opens (or creates) a store in the given database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::prepare(Connection::open(path)?)
    }

    /// A private store that disappears with the process.
    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(connection: Connection) -> Result<Self> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    async fn run<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut connection = connection
                .lock()
                .map_err(|e| FactoryError::Lock(e.to_string()))?;
            job(&mut connection)
        })
        .await?
    }

    /// All documents of `model` matching `filter`, in identifier order.
    pub async fn find(&self, model: &Model, filter: &Filter) -> Result<Vec<Document>> {
        let model = model.clone();
        let filter = filter.clone();
        self.run(move |connection| matching(connection, &model, &filter))
            .await
    }

    pub async fn find_one(&self, model: &Model, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find(model, filter).await?.into_iter().next())
    }

    /// Number of stored documents of `model`.
    pub async fn count(&self, model: &Model) -> Result<u64> {
        let collection = model.collection().to_owned();
        self.run(move |connection| {
            let count: u64 = connection.query_row(
                "select count(*) from Document where Collection = ?",
                params![collection],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }
}

fn matching(connection: &Connection, model: &Model, filter: &Filter) -> Result<Vec<Document>> {
    let mut statement = connection.prepare_cached(
        "
        select Document_Identity, Body
            from Document
            where Collection = ?
            order by Document_Identity
    ",
    )?;
    let rows = statement.query_map(params![model.collection()], |row| {
        Ok((row.get::<_, u64>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut found = Vec::new();
    for row in rows {
        let (id, body) = row?;
        let fields: Map<String, Value> = serde_json::from_str(&body)?;
        let mut document = Document::new(model.clone(), fields);
        document.assign_id(id);
        if filter.matches(&document) {
            found.push(document);
        }
    }
    Ok(found)
}

#[async_trait]
impl Provider for DocumentStore {
    fn create(&self, model: &Model, attributes: Map<String, Value>) -> Result<Document> {
        Ok(Document::new(model.clone(), attributes))
    }

    async fn save(&self, document: Document) -> Result<Document> {
        let body = serde_json::to_string(document.fields())?;
        let saved = self
            .run(move |connection| {
                let mut document = document;
                let collection = document.model().collection().to_owned();
                match document.id() {
                    Some(id) => {
                        let existing = connection
                            .query_row(
                                "select Collection from Document where Document_Identity = ?",
                                params![id],
                                |row| row.get::<_, String>(0),
                            )
                            .optional()?;
                        if existing.is_some_and(|c| c != collection) {
                            return Err(FactoryError::Persistence(format!(
                                "document {id} belongs to another collection than '{collection}'"
                            )));
                        }
                        connection.execute(
                            "
                            insert or replace into Document (Document_Identity, Collection, Body)
                                values (?, ?, ?)
                            ",
                            params![id, collection, body],
                        )?;
                    }
                    None => {
                        connection.execute(
                            "insert into Document (Collection, Body) values (?, ?)",
                            params![collection, body],
                        )?;
                        document.assign_id(connection.last_insert_rowid() as u64);
                    }
                }
                Ok(document)
            })
            .await;
        match &saved {
            Ok(d) => debug!(collection = %d.model(), id = d.id(), "store save"),
            Err(e) => warn!(error = %e, "store save failed"),
        }
        saved
    }

    async fn remove(&self, model: &Model, filter: &Filter) -> Result<u64> {
        let model = model.clone();
        let filter = filter.clone();
        let removed = self
            .run(move |connection| {
                let doomed = matching(connection, &model, &filter)?;
                let transaction = connection.transaction()?;
                {
                    let mut delete = transaction
                        .prepare_cached("delete from Document where Document_Identity = ?")?;
                    for document in &doomed {
                        delete.execute(params![document.id()])?;
                    }
                }
                transaction.commit()?;
                debug!(collection = %model, removed = doomed.len(), "store remove");
                Ok(doomed.len() as u64)
            })
            .await;
        if let Err(e) = &removed {
            warn!(error = %e, "store remove failed");
        }
        removed
    }
}
