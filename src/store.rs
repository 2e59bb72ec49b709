//! Persistence for accounts, aquariums, parameter readings and the detail catalog.
//!
//! Handlers only see the [`Store`] trait. [`MemoryStore`] keeps rows shaped
//! like the relational tables they replace: aquarium sub-collections are kept
//! as serialized JSON columns and decoded on read.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Aquarium, Catalog, Detail, DetailKind, Equipment, NewUser, ParameterEntry, Plant, Species,
    User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    /// A JSON column failed to encode or decode.
    #[error("failed to encode column: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_exists(&self, email: &str) -> Result<bool, StoreError>;

    async fn create_aquarium(&self, aquarium: &Aquarium) -> Result<(), StoreError>;
    async fn aquariums_for_user(&self, user_id: &str) -> Result<Vec<Aquarium>, StoreError>;
    async fn aquarium(&self, id: &str) -> Result<Option<Aquarium>, StoreError>;
    /// Only touches a row matching both id and owner.
    async fn update_aquarium(&self, aquarium: &Aquarium) -> Result<(), StoreError>;
    /// Only removes a row matching both id and owner.
    async fn delete_aquarium(&self, id: &str, user_id: &str) -> Result<(), StoreError>;

    async fn create_parameter_entry(&self, entry: &ParameterEntry) -> Result<(), StoreError>;
    /// Newest first.
    async fn parameter_entries(&self, aquarium_id: &str)
    -> Result<Vec<ParameterEntry>, StoreError>;

    async fn detail(&self, kind: DetailKind, id: &str) -> Result<Option<Detail>, StoreError>;
    async fn details(&self, kind: DetailKind) -> Result<Vec<Detail>, StoreError>;
}

// aquariums table row
struct AquariumRow {
    user_id: String,
    name: String,
    kind: String,
    size: String,
    species: String,
    plants: String,
    equipment: String,
}

impl AquariumRow {
    fn encode(aquarium: &Aquarium) -> Result<Self, StoreError> {
        Ok(Self {
            user_id: aquarium.user_id.clone(),
            name: aquarium.name.clone(),
            kind: aquarium.kind.clone(),
            size: aquarium.size.clone(),
            species: serde_json::to_string(&aquarium.species)?,
            plants: serde_json::to_string(&aquarium.plants)?,
            equipment: serde_json::to_string(&aquarium.equipment)?,
        })
    }

    fn decode(&self, id: &str) -> Result<Aquarium, StoreError> {
        Ok(Aquarium {
            id: id.to_string(),
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            size: self.size.clone(),
            species: serde_json::from_str::<Vec<Species>>(&self.species)?,
            plants: serde_json::from_str::<Vec<Plant>>(&self.plants)?,
            equipment: serde_json::from_str::<Vec<Equipment>>(&self.equipment)?,
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,                  // email -> user
    aquariums: DashMap<String, AquariumRow>,       // id -> row
    entries: DashMap<String, Vec<ParameterEntry>>, // aquarium id -> entries
    catalog: Catalog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        use dashmap::mapref::entry::Entry;

        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                let created = User {
                    id: Uuid::new_v4().to_string(),
                    email: user.email,
                    password_hash: user.password_hash,
                    first_name: user.first_name,
                    username: user.username,
                    subscribe: user.subscribe,
                    created_at: user.created_at,
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(email).map(|u| u.value().clone()))
    }

    async fn user_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.users.contains_key(email))
    }

    async fn create_aquarium(&self, aquarium: &Aquarium) -> Result<(), StoreError> {
        use dashmap::mapref::entry::Entry;

        let row = AquariumRow::encode(aquarium)?;
        match self.aquariums.entry(aquarium.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(row);
                Ok(())
            }
        }
    }

    async fn aquariums_for_user(&self, user_id: &str) -> Result<Vec<Aquarium>, StoreError> {
        self.aquariums
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| row.decode(row.key()))
            .collect()
    }

    async fn aquarium(&self, id: &str) -> Result<Option<Aquarium>, StoreError> {
        self.aquariums
            .get(id)
            .map(|row| row.decode(id))
            .transpose()
    }

    async fn update_aquarium(&self, aquarium: &Aquarium) -> Result<(), StoreError> {
        let row = AquariumRow::encode(aquarium)?;
        match self.aquariums.get_mut(&aquarium.id) {
            Some(mut existing) if existing.user_id == aquarium.user_id => {
                *existing = row;
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn delete_aquarium(&self, id: &str, user_id: &str) -> Result<(), StoreError> {
        match self.aquariums.remove_if(id, |_, row| row.user_id == user_id) {
            Some(_) => {
                self.entries.remove(id);
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn create_parameter_entry(&self, entry: &ParameterEntry) -> Result<(), StoreError> {
        if !self.aquariums.contains_key(&entry.aquarium_id) {
            return Err(StoreError::NotFound);
        }
        self.entries
            .entry(entry.aquarium_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn parameter_entries(
        &self,
        aquarium_id: &str,
    ) -> Result<Vec<ParameterEntry>, StoreError> {
        let mut entries = self
            .entries
            .get(aquarium_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    async fn detail(&self, kind: DetailKind, id: &str) -> Result<Option<Detail>, StoreError> {
        let found = match kind {
            DetailKind::Species => self
                .catalog
                .species
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .map(Detail::Species),
            DetailKind::Plant => self
                .catalog
                .plants
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .map(Detail::Plant),
            DetailKind::Equipment => self
                .catalog
                .equipment
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .map(Detail::Equipment),
        };
        Ok(found)
    }

    async fn details(&self, kind: DetailKind) -> Result<Vec<Detail>, StoreError> {
        let all = match kind {
            DetailKind::Species => self
                .catalog
                .species
                .iter()
                .cloned()
                .map(Detail::Species)
                .collect(),
            DetailKind::Plant => self.catalog.plants.iter().cloned().map(Detail::Plant).collect(),
            DetailKind::Equipment => self
                .catalog
                .equipment
                .iter()
                .cloned()
                .map(Detail::Equipment)
                .collect(),
        };
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Nemo".to_string(),
            username: "nemo".to_string(),
            subscribe: "false".to_string(),
            created_at: Utc::now(),
        }
    }

    fn tank(id: &str, owner: &str) -> Aquarium {
        Aquarium {
            id: id.to_string(),
            user_id: owner.to_string(),
            name: "Reef".to_string(),
            kind: "Saltwater".to_string(),
            size: "40".to_string(),
            species: vec![Species {
                name: "Clownfish".to_string(),
                count: Some(2),
                ..Default::default()
            }],
            plants: vec![],
            equipment: vec![Equipment {
                name: "Heater".to_string(),
                kind: "heating".to_string(),
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@b.c")).await.unwrap();

        assert!(store.user_exists("a@b.c").await.unwrap());
        assert!(matches!(
            store.create_user(new_user("a@b.c")).await,
            Err(StoreError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn aquarium_round_trips_through_json_columns() {
        let store = MemoryStore::new();
        let reef = tank("t1", "u1");
        store.create_aquarium(&reef).await.unwrap();

        assert_eq!(store.aquarium("t1").await.unwrap(), Some(reef.clone()));
        assert_eq!(store.aquariums_for_user("u1").await.unwrap(), vec![reef]);
        assert!(store.aquariums_for_user("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_require_owner() {
        let store = MemoryStore::new();
        store.create_aquarium(&tank("t1", "u1")).await.unwrap();

        let mut hijack = tank("t1", "u2");
        hijack.name = "Mine now".to_string();
        assert!(matches!(
            store.update_aquarium(&hijack).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete_aquarium("t1", "u2").await,
            Err(StoreError::NotFound)
        ));

        let mut renamed = tank("t1", "u1");
        renamed.name = "Lagoon".to_string();
        store.update_aquarium(&renamed).await.unwrap();
        assert_eq!(store.aquarium("t1").await.unwrap().unwrap().name, "Lagoon");

        store.delete_aquarium("t1", "u1").await.unwrap();
        assert!(store.aquarium("t1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn parameter_entries_newest_first() {
        let store = MemoryStore::new();
        store.create_aquarium(&tank("t1", "u1")).await.unwrap();

        for (id, ts) in [("e1", 100), ("e2", 300), ("e3", 200)] {
            let entry = ParameterEntry {
                id: id.to_string(),
                aquarium_id: "t1".to_string(),
                timestamp: ts,
                ph: Some(8.1),
                ..Default::default()
            };
            store.create_parameter_entry(&entry).await.unwrap();
        }

        let ids: Vec<_> = store
            .parameter_entries("t1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["e2", "e3", "e1"]);
    }

    #[tokio::test]
    async fn catalog_lookup_by_kind() {
        let store = MemoryStore::with_catalog(Catalog {
            species: vec![Species {
                id: "s1".to_string(),
                name: "Neon Tetra".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });

        assert!(matches!(
            store.detail(DetailKind::Species, "s1").await.unwrap(),
            Some(Detail::Species(s)) if s.name == "Neon Tetra"
        ));
        assert!(store.detail(DetailKind::Plant, "s1").await.unwrap().is_none());
        assert_eq!(store.details(DetailKind::Species).await.unwrap().len(), 1);
        assert!(store.details(DetailKind::Equipment).await.unwrap().is_empty());
    }
}
