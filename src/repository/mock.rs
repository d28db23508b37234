//! Mock repository implementations for isolating stores in tests.

use mockall::mock;

use crate::repository::errors::RepositoryResult;
use crate::repository::{KeyValueReader, KeyValueWriter};

mock! {
    pub Repository {}

    impl KeyValueReader for Repository {
        fn get_value(&self, key: &str) -> RepositoryResult<Option<String>>;
    }

    impl KeyValueWriter for Repository {
        fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()>;
        fn remove_value(&self, key: &str) -> RepositoryResult<()>;
    }
}
