//! Diesel implementation of the key-value traits.

use chrono::Utc;
use diesel::prelude::*;

use crate::models::kv_entry::{KvEntry, NewKvEntry};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, KeyValueReader, KeyValueWriter};

impl KeyValueReader for DieselRepository {
    fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        use crate::schema::kv_entries;

        let mut conn = self.conn()?;
        let entry = kv_entries::table
            .filter(kv_entries::key.eq(key))
            .select(KvEntry::as_select())
            .first::<KvEntry>(&mut conn)
            .optional()?;

        Ok(entry.map(|entry| entry.value))
    }
}

impl KeyValueWriter for DieselRepository {
    fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        use crate::schema::kv_entries;

        let mut conn = self.conn()?;
        let entry = NewKvEntry {
            key,
            value,
            updated_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(kv_entries::table)
            .values(&entry)
            .on_conflict(kv_entries::key)
            .do_update()
            .set(&entry)
            .execute(&mut conn)?;

        Ok(())
    }

    fn remove_value(&self, key: &str) -> RepositoryResult<()> {
        use crate::schema::kv_entries;

        let mut conn = self.conn()?;
        diesel::delete(kv_entries::table.filter(kv_entries::key.eq(key))).execute(&mut conn)?;
        Ok(())
    }
}
