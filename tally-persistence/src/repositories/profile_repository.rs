use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::entities::{prelude::*, profiles};
use crate::store::ProfileStore;
use tally_types::{RootState, UserIdentity};

pub const ROOT_STATE_KEY: &str = "tally.root-state";
pub const IDENTITY_KEY: &str = "tally.current-user";

/// SeaORM-backed profile store: two fixed-key JSON blobs, read at
/// startup and rewritten after every change.
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let record = Profiles::find_by_id(key.to_string()).one(&self.db).await?;

        match record {
            Some(model) => {
                let value = serde_json::from_str(&model.payload)
                    .with_context(|| format!("corrupt profile blob under {key}"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn save_blob<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_string(value)?;

        let model = profiles::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            payload: ActiveValue::Set(payload),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        Profiles::insert(model)
            .on_conflict(
                OnConflict::column(profiles::Column::Key)
                    .update_columns([profiles::Column::Payload, profiles::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn load_root(&self) -> Result<Option<RootState>> {
        self.load_blob(ROOT_STATE_KEY).await
    }

    async fn save_root(&self, root: &RootState) -> Result<()> {
        self.save_blob(ROOT_STATE_KEY, root).await
    }

    async fn load_identity(&self) -> Result<Option<UserIdentity>> {
        self.load_blob(IDENTITY_KEY).await
    }

    async fn save_identity(&self, identity: &UserIdentity) -> Result<()> {
        self.save_blob(IDENTITY_KEY, identity).await
    }
}
