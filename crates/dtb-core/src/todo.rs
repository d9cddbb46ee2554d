use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    domain::GuildId,
    errors::{Error, ValidationError},
    store::{GuildTodo, TodoDocument, TodoStore},
    Result,
};

/// One async lock per guild so that mutations for the same guild run one at a
/// time, even across await points.
#[derive(Default)]
pub struct GuildLocks {
    inner: Mutex<HashMap<GuildId, Arc<Mutex<()>>>>,
}

impl GuildLocks {
    pub async fn lock_guild(&self, guild: &GuildId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(guild.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Per-guild shared to-do lists, written through to a [`TodoStore`].
///
/// Every mutating call returns only after the full document has been saved.
/// If the save fails the in-memory state is rolled back, so memory never runs
/// ahead of disk.
pub struct TodoRegistry {
    store: TodoStore,
    doc: Mutex<TodoDocument>,
    locks: GuildLocks,
}

impl TodoRegistry {
    pub fn new(store: TodoStore, doc: TodoDocument) -> Self {
        Self {
            store,
            doc: Mutex::new(doc),
            locks: GuildLocks::default(),
        }
    }

    /// Load the registry from `store`, starting empty if the document is corrupt.
    pub fn open(store: TodoStore) -> Result<Self> {
        let doc = match store.load() {
            Ok(doc) => doc,
            Err(Error::CorruptState { path, reason }) => {
                tracing::warn!(
                    path = %path.display(),
                    %reason,
                    "to-do document is corrupt, starting with an empty registry"
                );
                TodoDocument::new()
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            path = %store.path().display(),
            guilds = doc.len(),
            "loaded to-do registry"
        );
        Ok(Self::new(store, doc))
    }

    pub async fn view(&self, guild: &GuildId) -> GuildTodo {
        self.doc
            .lock()
            .await
            .get(&guild.0)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn add_task(&self, guild: &GuildId, text: &str) -> Result<Vec<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyTask.into());
        }
        self.mutate(guild, |todo| {
            todo.tasks.push(text.to_string());
            Ok(todo.tasks.clone())
        })
        .await
    }

    /// Remove the task at 1-based `index` and return its text.
    pub async fn remove_task(&self, guild: &GuildId, index: Option<i64>) -> Result<String> {
        self.mutate(guild, |todo| {
            if todo.tasks.is_empty() {
                return Err(ValidationError::EmptyList.into());
            }
            let index = index.ok_or(ValidationError::MissingIndex)?;
            let pos = to_position(index, todo.tasks.len())?;
            Ok(todo.tasks.remove(pos))
        })
        .await
    }

    pub async fn assign(&self, guild: &GuildId, user: Option<&str>) -> Result<()> {
        let user = user
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ValidationError::MissingUser)?;
        self.mutate(guild, |todo| {
            todo.assigned_user = Some(user.to_string());
            Ok(())
        })
        .await
    }

    async fn mutate<T>(
        &self,
        guild: &GuildId,
        apply: impl FnOnce(&mut GuildTodo) -> Result<T>,
    ) -> Result<T> {
        let _guild = self.locks.lock_guild(guild).await;

        // Work on a copy; `view` keeps seeing the committed state until the save lands.
        let mut next = self.view(guild).await;
        let out = apply(&mut next)?;

        // Held across the save so concurrent writers for other guilds never
        // persist a snapshot missing this commit.
        let mut doc = self.doc.lock().await;
        let prev = doc.insert(guild.0.clone(), next);
        if let Err(e) = self.store.save(&doc).await {
            match prev {
                Some(p) => doc.insert(guild.0.clone(), p),
                None => doc.remove(&guild.0),
            };
            return Err(e);
        }
        Ok(out)
    }
}

/// Parse a user-supplied task number.
pub fn parse_task_index(raw: &str) -> std::result::Result<Option<i64>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| ValidationError::NotAnInteger(raw.to_string()))
}

fn to_position(index: i64, len: usize) -> std::result::Result<usize, ValidationError> {
    match usize::try_from(index) {
        Ok(i) if (1..=len).contains(&i) => Ok(i - 1),
        _ => Err(ValidationError::IndexOutOfRange { index, len }),
    }
}
