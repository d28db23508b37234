//! Diesel models for the key-value table backing persisted user state.

use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::kv_entries)]
/// Stored value of a single key.
pub struct KvEntry {
    pub key: String,
    pub value: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::kv_entries)]
#[diesel(primary_key(key))]
/// Insertable and updatable form of [`KvEntry`].
pub struct NewKvEntry<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub updated_at: NaiveDateTime,
}
