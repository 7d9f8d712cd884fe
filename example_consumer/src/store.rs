//! In-memory study store and the handlers bound to the schema's routes.

use blueprint_sdk::{Arguments, Failure, HandlerRegistry};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Study {
    pub id: String,
    pub name: String,
    pub researcher_id: String,
    /// Milliseconds since the Unix epoch.
    pub created: i64,
}

#[derive(Debug, Deserialize)]
struct NewStudy {
    name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("study {0} not found")]
pub struct StudyNotFound(String);

#[derive(Debug, thiserror::Error)]
#[error("study {study} belongs to another researcher")]
pub struct NotOwner {
    study: String,
}

#[derive(Debug, thiserror::Error)]
#[error("no researcher on this request")]
pub struct Unauthenticated;

#[derive(Default)]
pub struct StudyStore {
    studies: RwLock<HashMap<String, Study>>,
}

impl StudyStore {
    pub async fn list(&self, researcher: Option<&str>) -> Vec<Study> {
        let studies = self.studies.read().await;
        let mut found: Vec<Study> = studies
            .values()
            .filter(|s| researcher.map_or(true, |r| s.researcher_id == r))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        found
    }

    pub async fn get(&self, id: &str) -> Result<Study, StudyNotFound> {
        self.studies
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StudyNotFound(id.to_string()))
    }

    pub async fn create(&self, researcher_id: &str, name: String) -> Study {
        let study = Study {
            id: Uuid::new_v4().to_string(),
            name,
            researcher_id: researcher_id.to_string(),
            created: Utc::now().timestamp_millis(),
        };
        self.studies.write().await.insert(study.id.clone(), study.clone());
        tracing::info!(study = %study.id, researcher = %researcher_id, "study created");
        study
    }

    pub async fn remove(&self, id: &str, researcher: Option<&str>) -> Result<Study, Failure> {
        let mut studies = self.studies.write().await;
        let study = studies.get(id).ok_or_else(|| StudyNotFound(id.to_string()))?;
        if researcher != Some(study.researcher_id.as_str()) {
            return Err(NotOwner { study: id.to_string() }.into());
        }
        let removed = studies.remove(id).ok_or_else(|| StudyNotFound(id.to_string()))?;
        Ok(removed)
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, Failure> {
    Ok(serde_json::to_value(value)?)
}

/// Handlers for every route declared in `schema/study.json`.
pub fn handlers(store: Arc<StudyStore>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    let s = Arc::clone(&store);
    registry.register("Study", "list", move |args: Arguments| {
        let store = Arc::clone(&s);
        async move { to_value(&store.list(args.str(0)).await) }
    });

    let s = Arc::clone(&store);
    registry.register("Study", "view", move |args: Arguments| {
        let store = Arc::clone(&s);
        async move {
            let id = args.str(0).unwrap_or_default();
            to_value(&store.get(id).await?)
        }
    });

    let s = Arc::clone(&store);
    registry.register("Study", "create", move |args: Arguments| {
        let store = Arc::clone(&s);
        async move {
            let researcher = args.str(0).unwrap_or_default().to_string();
            let new: NewStudy = args.decode(1)?;
            to_value(&store.create(&researcher, new.name).await)
        }
    });

    let s = Arc::clone(&store);
    registry.register("Study", "remove", move |args: Arguments| {
        let store = Arc::clone(&s);
        async move {
            let id = args.str(0).unwrap_or_default();
            to_value(&store.remove(id, args.str(1)).await?)
        }
    });

    let s = Arc::clone(&store);
    registry.register("Researcher", "me", move |args: Arguments| {
        let store = Arc::clone(&s);
        async move {
            let researcher = args.str(0).ok_or(Unauthenticated)?;
            let studies = store.list(Some(researcher)).await.len();
            Ok::<_, Failure>(serde_json::json!({ "id": researcher, "studies": studies }))
        }
    });

    registry
}
