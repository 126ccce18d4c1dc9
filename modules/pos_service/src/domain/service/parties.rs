//! Customers, suppliers and promos

use super::{internal, Service};
use crate::contract::model::{
    ChangeKind, ChangeTable, NewParty, NewPromo, Page, Party, PartyKind, PartyPatch, Promo,
    TenantScope,
};
use crate::contract::PosError;
use crate::domain::events::ChangeEvent;
use crate::domain::pricing::ensure_amount;
use crate::domain::validation::{normalize_promo_code, require_name};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

impl Service {
    // ===== Parties =====

    pub async fn create_party(&self, scope: &TenantScope, input: NewParty) -> Result<Party, PosError> {
        let name = require_name(&format!("{} name", input.kind), &input.name)?;
        let email = trimmed(input.email);
        if let Some(email) = &email {
            validate_email(email)?;
        }

        let now = Utc::now();
        let party = Party {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            kind: input.kind,
            name,
            phone: trimmed(input.phone),
            email,
            address: trimmed(input.address),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let saved = self
            .repos
            .parties
            .save_party(&party)
            .await
            .map_err(internal("save party"))?;

        self.publish(party_event(&saved, ChangeKind::Insert)).await;
        self.audit(
            scope,
            None,
            &format!("{}.create", saved.kind),
            "parties",
            saved.id,
            json!({ "name": saved.name }),
        )
        .await;
        Ok(saved)
    }

    pub async fn get_party(&self, scope: &TenantScope, id: Uuid) -> Result<Party, PosError> {
        self.repos
            .parties
            .find_party(scope.tenant_id, id)
            .await
            .map_err(internal("find party"))?
            .filter(|p| p.deleted_at.is_none())
            .ok_or_else(|| PosError::not_found("party", id))
    }

    pub async fn list_parties(
        &self,
        scope: &TenantScope,
        kind: PartyKind,
        search: Option<&str>,
        page: Page,
    ) -> Result<Vec<Party>, PosError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repos
            .parties
            .list_parties(scope.tenant_id, kind, search, page)
            .await
            .map_err(internal("list parties"))
    }

    pub async fn update_party(
        &self,
        scope: &TenantScope,
        id: Uuid,
        patch: PartyPatch,
    ) -> Result<Party, PosError> {
        let mut party = self.get_party(scope, id).await?;

        if let Some(name) = patch.name {
            party.name = require_name(&format!("{} name", party.kind), &name)?;
        }
        if let Some(phone) = patch.phone {
            party.phone = trimmed(Some(phone));
        }
        if let Some(email) = patch.email {
            let email = trimmed(Some(email));
            if let Some(email) = &email {
                validate_email(email)?;
            }
            party.email = email;
        }
        if let Some(address) = patch.address {
            party.address = trimmed(Some(address));
        }
        party.updated_at = Utc::now();

        let saved = self
            .repos
            .parties
            .save_party(&party)
            .await
            .map_err(internal("save party"))?;

        self.publish(party_event(&saved, ChangeKind::Update)).await;
        self.audit(
            scope,
            None,
            &format!("{}.update", saved.kind),
            "parties",
            saved.id,
            json!({ "name": saved.name }),
        )
        .await;
        Ok(saved)
    }

    /// Soft delete; documents keep referencing the party
    pub async fn delete_party(&self, scope: &TenantScope, id: Uuid) -> Result<(), PosError> {
        let mut party = self.get_party(scope, id).await?;
        let now = Utc::now();
        party.deleted_at = Some(now);
        party.updated_at = now;
        self.repos
            .parties
            .save_party(&party)
            .await
            .map_err(internal("delete party"))?;

        self.publish(party_event(&party, ChangeKind::Delete)).await;
        self.audit(
            scope,
            None,
            &format!("{}.delete", party.kind),
            "parties",
            party.id,
            json!({ "name": party.name }),
        )
        .await;
        Ok(())
    }

    /// Live party of the given kind, `NotFound` otherwise
    pub(super) async fn require_party(
        &self,
        scope: &TenantScope,
        id: Uuid,
        kind: PartyKind,
    ) -> Result<Party, PosError> {
        match self.get_party(scope, id).await {
            Ok(party) if party.kind == kind => Ok(party),
            Ok(_) | Err(PosError::NotFound { .. }) => Err(PosError::not_found(kind.as_str(), id)),
            Err(e) => Err(e),
        }
    }

    // ===== Promos =====

    pub async fn create_promo(&self, scope: &TenantScope, input: NewPromo) -> Result<Promo, PosError> {
        let code = normalize_promo_code(&input.code)?;
        let name = require_name("promo name", &input.name)?;
        if input.percent_off <= Decimal::ZERO || input.percent_off > Decimal::ONE_HUNDRED {
            return Err(PosError::validation(
                "percent off must be greater than 0 and at most 100",
            ));
        }
        if let Some(cap) = input.max_discount {
            ensure_amount("maximum discount", cap)?;
        }
        ensure_amount("minimum purchase", input.min_purchase)?;
        if input.ends_at.is_some_and(|end| end <= input.starts_at) {
            return Err(PosError::validation("promo must end after it starts"));
        }

        let existing = self
            .repos
            .promos
            .find_promo_by_code(scope.tenant_id, &code)
            .await
            .map_err(internal("find promo"))?;
        if existing.is_some() {
            return Err(PosError::conflict(format!("promo code '{}' already exists", code)));
        }

        let promo = Promo {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            code,
            name,
            percent_off: input.percent_off,
            max_discount: input.max_discount,
            min_purchase: input.min_purchase,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            active: true,
            created_at: Utc::now(),
        };
        let saved = self
            .repos
            .promos
            .save_promo(&promo)
            .await
            .map_err(internal("save promo"))?;

        self.publish(ChangeEvent::new(
            ChangeTable::Promos,
            ChangeKind::Insert,
            scope.tenant_id,
            saved.id,
        ))
        .await;
        self.audit(
            scope,
            None,
            "promo.create",
            "promos",
            saved.id,
            json!({ "code": saved.code }),
        )
        .await;
        Ok(saved)
    }

    /// Newest first
    pub async fn list_promos(&self, scope: &TenantScope) -> Result<Vec<Promo>, PosError> {
        self.repos
            .promos
            .list_promos(scope.tenant_id)
            .await
            .map_err(internal("list promos"))
    }

    /// Lookup by code, case-insensitive
    pub async fn get_promo(&self, scope: &TenantScope, code: &str) -> Result<Promo, PosError> {
        let code = normalize_promo_code(code)?;
        self.repos
            .promos
            .find_promo_by_code(scope.tenant_id, &code)
            .await
            .map_err(internal("find promo"))?
            .ok_or_else(|| PosError::not_found("promo", code))
    }

    pub async fn deactivate_promo(&self, scope: &TenantScope, code: &str) -> Result<Promo, PosError> {
        let mut promo = self.get_promo(scope, code).await?;
        if !promo.active {
            return Ok(promo);
        }
        promo.active = false;
        let saved = self
            .repos
            .promos
            .save_promo(&promo)
            .await
            .map_err(internal("save promo"))?;

        self.publish(ChangeEvent::new(
            ChangeTable::Promos,
            ChangeKind::Update,
            scope.tenant_id,
            saved.id,
        ))
        .await;
        self.audit(
            scope,
            None,
            "promo.deactivate",
            "promos",
            saved.id,
            json!({ "code": saved.code }),
        )
        .await;
        Ok(saved)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_email(email: &str) -> Result<(), PosError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(PosError::validation(format!("invalid email address '{}'", email))),
    }
}

fn party_event(party: &Party, kind: ChangeKind) -> ChangeEvent {
    ChangeEvent::new(ChangeTable::Parties, kind, party.tenant_id, party.id)
}
