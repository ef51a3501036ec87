//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserCredentials, UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId, Username};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &'static str) -> UserPersistenceError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
        DieselFailure::UniqueViolation { constraint } => match constraint.as_deref() {
            Some("users_username_key") => UserPersistenceError::unique_violation("username"),
            Some("users_email_key") => UserPersistenceError::unique_violation("email"),
            other => UserPersistenceError::query(format!(
                "unexpected unique violation on {}",
                other.unwrap_or("unknown constraint")
            )),
        },
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &UserCredentials) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert user"))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user by id"))?;
        row.map(UserRow::into_user)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user by username"))?;
        row.map(UserRow::into_credentials)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "check username"))
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(users::table.filter(users::email.eq(email.as_ref()))))
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "check email"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for constraint mapping; queries are exercised by
    //! the embedded PostgreSQL suite in `tests/`.
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct ConstraintInfo(&'static str);

    impl DatabaseErrorInformation for ConstraintInfo {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[rstest]
    #[case("users_username_key", UserPersistenceError::unique_violation("username"))]
    #[case("users_email_key", UserPersistenceError::unique_violation("email"))]
    #[case(
        "users_pkey",
        UserPersistenceError::query("unexpected unique violation on users_pkey")
    )]
    fn unique_violations_name_the_form_field(
        #[case] constraint: &'static str,
        #[case] expected: UserPersistenceError,
    ) {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(ConstraintInfo(constraint)),
        );
        assert_eq!(map_diesel_error(error, "insert user"), expected);
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(error, UserPersistenceError::connection("timed out"));
    }
}
