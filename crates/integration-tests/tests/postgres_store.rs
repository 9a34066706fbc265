//! `PgStore` against a real database.
//!
//! Each test gets a fresh database with migrations applied by `sqlx::test`.
//! Requires `DATABASE_URL` pointing at a `PostgreSQL` server where the user
//! may create databases.

use bridgia_core::{Email, NewSubmission, PasswordHash};
use bridgia_site::db::{CredentialStore, PgStore, RepositoryError, Store, SubmissionStore};
use sqlx::PgPool;

fn new_submission(name: &str, company: Option<&str>) -> NewSubmission {
    NewSubmission {
        name: name.to_owned(),
        email: Email::parse("visitor@example.com").expect("valid email"),
        company: company.map(str::to_owned),
        message: "Hello".to_owned(),
    }
}

#[sqlx::test(migrator = "bridgia_site::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_submissions_round_trip(pool: PgPool) {
    let store = PgStore::new(pool);

    let created = store
        .create_submission(new_submission("Jane", Some("Acme")))
        .await
        .expect("insert failed");
    store
        .create_submission(new_submission("Omar", None))
        .await
        .expect("insert failed");

    let all = store.list_submissions().await.expect("list failed");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Omar");
    assert_eq!(all[0].company, None);
    assert_eq!(all[1], created);

    let recent = store.recent_submissions(1).await.expect("list failed");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].name, "Omar");
}

#[sqlx::test(migrator = "bridgia_site::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_credential_singleton(pool: PgPool) {
    let store = PgStore::new(pool);
    store.ping().await.expect("ping failed");

    assert!(store.get_credential().await.expect("get failed").is_none());
    assert!(matches!(
        store
            .replace_credential(&PasswordHash::new("early".to_owned()))
            .await,
        Err(RepositoryError::NotFound)
    ));

    store
        .insert_credential(&PasswordHash::new("first".to_owned()))
        .await
        .expect("insert failed");
    assert!(matches!(
        store
            .insert_credential(&PasswordHash::new("second".to_owned()))
            .await,
        Err(RepositoryError::Conflict(_))
    ));

    store
        .replace_credential(&PasswordHash::new("rotated".to_owned()))
        .await
        .expect("replace failed");
    let credential = store
        .get_credential()
        .await
        .expect("get failed")
        .expect("credential missing");
    assert_eq!(credential.password_hash.as_str(), "rotated");
    assert!(credential.updated_at >= credential.created_at);
}
