//! Tenants, stores, system configuration and the audit log

use super::{internal, Service};
use crate::contract::model::{
    AuditEntry, ChangeKind, ChangeTable, ConfigEntry, Store, Tenant, TenantScope,
};
use crate::contract::PosError;
use crate::domain::events::ChangeEvent;
use crate::domain::validation::{require_name, validate_config_key};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

impl Service {
    // ===== Tenants and stores =====

    pub async fn create_tenant(&self, name: &str) -> Result<Tenant, PosError> {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: require_name("tenant name", name)?,
            created_at: Utc::now(),
        };
        let saved = self
            .repos
            .tenants
            .create_tenant(&tenant)
            .await
            .map_err(internal("create tenant"))?;
        tracing::info!(tenant_id = %saved.id, name = %saved.name, "tenant created");
        Ok(saved)
    }

    pub async fn get_tenant(&self, id: Uuid) -> Result<Tenant, PosError> {
        self.repos
            .tenants
            .find_tenant(id)
            .await
            .map_err(internal("find tenant"))?
            .ok_or_else(|| PosError::not_found("tenant", id))
    }

    /// Store-pinned callers cannot open new stores
    pub async fn create_store(
        &self,
        scope: &TenantScope,
        name: &str,
        address: Option<String>,
    ) -> Result<Store, PosError> {
        if scope.store_id.is_some() {
            return Err(PosError::Forbidden {
                reason: "a store-scoped caller cannot create stores".to_string(),
            });
        }
        self.get_tenant(scope.tenant_id).await?;

        let store = Store {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            name: require_name("store name", name)?,
            address: address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            created_at: Utc::now(),
        };
        let saved = self
            .repos
            .tenants
            .create_store(&store)
            .await
            .map_err(internal("create store"))?;

        self.publish(
            ChangeEvent::new(ChangeTable::Stores, ChangeKind::Insert, scope.tenant_id, saved.id)
                .in_store(Some(saved.id)),
        )
        .await;
        self.audit(
            scope,
            Some(saved.id),
            "store.create",
            "stores",
            saved.id,
            json!({ "name": saved.name }),
        )
        .await;
        Ok(saved)
    }

    /// Stores visible to the scope, ordered by name
    pub async fn list_stores(&self, scope: &TenantScope) -> Result<Vec<Store>, PosError> {
        let stores = self
            .repos
            .tenants
            .list_stores(scope.tenant_id)
            .await
            .map_err(internal("list stores"))?;
        Ok(stores
            .into_iter()
            .filter(|s| scope.allows_store(s.id))
            .collect())
    }

    // ===== System config =====

    pub async fn get_config(&self, scope: &TenantScope, key: &str) -> Result<ConfigEntry, PosError> {
        validate_config_key(key)?;
        self.repos
            .config
            .get(scope.tenant_id, key)
            .await
            .map_err(internal("get config"))?
            .ok_or_else(|| PosError::not_found("config", key))
    }

    pub async fn set_config(
        &self,
        scope: &TenantScope,
        key: &str,
        value: serde_json::Value,
    ) -> Result<ConfigEntry, PosError> {
        validate_config_key(key)?;
        let existed = self
            .repos
            .config
            .get(scope.tenant_id, key)
            .await
            .map_err(internal("get config"))?
            .is_some();

        let entry = ConfigEntry {
            tenant_id: scope.tenant_id,
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        let saved = self
            .repos
            .config
            .upsert(&entry)
            .await
            .map_err(internal("upsert config"))?;

        let kind = if existed {
            ChangeKind::Update
        } else {
            ChangeKind::Insert
        };
        self.publish(ChangeEvent::new(
            ChangeTable::Config,
            kind,
            scope.tenant_id,
            config_record_id(scope.tenant_id, key),
        ))
        .await;
        self.audit(
            scope,
            None,
            "config.set",
            "system_config",
            config_record_id(scope.tenant_id, key),
            json!({ "key": key, "value": saved.value }),
        )
        .await;
        Ok(saved)
    }

    /// Ordered by key
    pub async fn list_config(&self, scope: &TenantScope) -> Result<Vec<ConfigEntry>, PosError> {
        self.repos
            .config
            .list(scope.tenant_id)
            .await
            .map_err(internal("list config"))
    }

    pub async fn delete_config(&self, scope: &TenantScope, key: &str) -> Result<(), PosError> {
        validate_config_key(key)?;
        let removed = self
            .repos
            .config
            .delete(scope.tenant_id, key)
            .await
            .map_err(internal("delete config"))?;
        if !removed {
            return Err(PosError::not_found("config", key));
        }

        self.publish(ChangeEvent::new(
            ChangeTable::Config,
            ChangeKind::Delete,
            scope.tenant_id,
            config_record_id(scope.tenant_id, key),
        ))
        .await;
        self.audit(
            scope,
            None,
            "config.delete",
            "system_config",
            config_record_id(scope.tenant_id, key),
            json!({ "key": key }),
        )
        .await;
        Ok(())
    }

    // ===== Audit =====

    /// Newest first; a store-pinned scope sees its store and tenant-wide entries
    pub async fn list_audit(
        &self,
        scope: &TenantScope,
        limit: Option<u64>,
    ) -> Result<Vec<AuditEntry>, PosError> {
        let limit = self.config.page_limit(limit);
        let entries = self
            .repos
            .audit
            .list(scope.tenant_id, limit)
            .await
            .map_err(internal("list audit"))?;
        Ok(entries
            .into_iter()
            .filter(|e| e.store_id.map_or(true, |store_id| scope.allows_store(store_id)))
            .collect())
    }
}

/// Config rows are keyed by (tenant, key); change events need a stable uuid
fn config_record_id(tenant_id: Uuid, key: &str) -> Uuid {
    Uuid::new_v5(&tenant_id, key.as_bytes())
}
