//! Store behavior backed by the schema's unique constraints. Each test gets
//! a fresh database with the migrations applied.

use sqlx::PgPool;
use unigig_core::{actions, Role};
use unigig_store::gigs::NewGig;
use unigig_store::models::UserRow;
use unigig_store::users::NewUser;
use unigig_store::{Store, StoreError};
use uuid::Uuid;

async fn create_user(store: &Store, email: &str, role: Role) -> UserRow {
    store
        .create_user(NewUser {
            email,
            password_hash: "$argon2id$unused",
            name: "Test User",
            role,
        })
        .await
        .unwrap()
}

async fn create_category(pool: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, 'Design', '')")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
    id
}

#[sqlx::test]
async fn repeated_conversation_creation_returns_one_row(pool: PgPool) {
    let store = Store::from_pool(pool.clone());
    let a = create_user(&store, "a@x.com", Role::Student).await;
    let b = create_user(&store, "b@x.com", Role::Client).await;

    let (first, created_first) = store.ensure_conversation(a.id, b.id).await.unwrap();
    // Participant order flipped on the second call.
    let (second, created_second) = store.ensure_conversation(b.id, a.id).await.unwrap();

    assert!(created_first);
    assert!(!created_second);
    assert_eq!(first.id, second.id);

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM conversations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn second_review_for_an_activity_log_is_a_conflict(pool: PgPool) {
    let store = Store::from_pool(pool.clone());
    let client_user = create_user(&store, "client@x.com", Role::Client).await;
    let client = store
        .create_client(client_user.id, Some("Acme"))
        .await
        .unwrap();
    let category_id = create_category(&pool).await;

    let gig_id = store
        .create_gig(NewGig {
            title: "Logo refresh",
            description: "New logo for the landing page",
            budget: 150.0,
            client_id: client.id,
            category_id,
        })
        .await
        .unwrap();
    let log = store
        .log_activity(actions::GIG_CREATED, client_user.id, gig_id)
        .await
        .unwrap();

    store.create_review(5, Some("Great work"), log.id).await.unwrap();

    let second = store.create_review(4, None, log.id).await;
    assert!(matches!(second, Err(StoreError::Conflict)));

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn duplicate_email_registration_is_a_conflict(pool: PgPool) {
    let store = Store::from_pool(pool);
    create_user(&store, "dup@x.com", Role::Student).await;

    let second = store
        .create_user(NewUser {
            email: "dup@x.com",
            password_hash: "$argon2id$unused",
            name: "Someone Else",
            role: Role::Client,
        })
        .await;
    assert!(matches!(second, Err(StoreError::Conflict)));
}
