mod common;

use assert_matches::assert_matches;
use bakeshop_api::entities::{customer, employee, manager, user_account, UserRole};
use bakeshop_api::errors::ServiceError;
use bakeshop_api::services::accounts::UpdateProfileInput;
use chrono::{NaiveDate, Utc};
use common::TestContext;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

async fn seed_account(ctx: &TestContext, email: &str, role_id: i32) -> i32 {
    let account = user_account::ActiveModel {
        email: Set(email.to_string()),
        password: Set("secret-hash".to_string()),
        role_id: Set(role_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    account
        .insert(&*ctx.db)
        .await
        .expect("seed login row")
        .id
}

fn birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(1994, 6, 12).expect("valid date")
}

#[tokio::test]
async fn register_creates_login_and_profile_together() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    let created = accounts
        .register("mai@example.com", "hash-1", "Mai Tran")
        .await
        .expect("register");

    assert_eq!(created.email, "mai@example.com");

    let identity = accounts
        .find_by_email("mai@example.com")
        .await
        .expect("lookup")
        .expect("identity present");

    assert_eq!(identity.id, created.id);
    assert_eq!(identity.fullname, "Mai Tran");
    assert_eq!(identity.password, "hash-1");
    assert_eq!(identity.role, UserRole::Customer);

    let profile = customer::Entity::find_by_id(created.id)
        .one(&*ctx.db)
        .await
        .expect("query profile");
    assert!(profile.is_some());
}

#[tokio::test]
async fn register_with_duplicate_email_leaves_single_account() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    accounts
        .register("dup@example.com", "hash-1", "First")
        .await
        .expect("first register");

    let second = accounts.register("dup@example.com", "hash-2", "Second").await;
    assert_matches!(second, Err(ServiceError::DatabaseError(_)));

    let count = user_account::Entity::find()
        .filter(user_account::Column::Email.eq("dup@example.com"))
        .count(&*ctx.db)
        .await
        .expect("count accounts");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn find_by_email_misses_unknown_address() {
    let ctx = TestContext::new().await;

    let found = ctx
        .services
        .accounts
        .find_by_email("nobody@example.com")
        .await
        .expect("lookup");

    assert!(found.is_none());
}

#[tokio::test]
async fn find_by_email_dispatches_to_employee_profile() {
    let ctx = TestContext::new().await;
    let id = seed_account(&ctx, "staff@example.com", UserRole::Employee.id()).await;

    let profile = employee::ActiveModel {
        user_id: Set(id),
        fullname: Set("Binh Le".to_string()),
        department: Set(Some("Ovens".to_string())),
        ..Default::default()
    };
    profile.insert(&*ctx.db).await.expect("seed employee");

    let identity = ctx
        .services
        .accounts
        .find_by_email("staff@example.com")
        .await
        .expect("lookup")
        .expect("identity present");

    assert_eq!(identity.fullname, "Binh Le");
    assert_eq!(identity.role, UserRole::Employee);
}

#[tokio::test]
async fn find_by_email_treats_missing_profile_as_not_found() {
    let ctx = TestContext::new().await;
    // Employee login without an employee row: a data-integrity gap, not an
    // error.
    seed_account(&ctx, "ghost@example.com", UserRole::Employee.id()).await;

    let found = ctx
        .services
        .accounts
        .find_by_email("ghost@example.com")
        .await
        .expect("lookup");

    assert!(found.is_none());
}

#[tokio::test]
async fn find_by_email_treats_unknown_role_as_not_found() {
    let ctx = TestContext::new().await;
    seed_account(&ctx, "odd@example.com", 9).await;

    let found = ctx
        .services
        .accounts
        .find_by_email("odd@example.com")
        .await
        .expect("lookup");

    assert!(found.is_none());
}

#[tokio::test]
async fn find_by_id_defaults_fullname_when_profile_is_missing() {
    let ctx = TestContext::new().await;
    let id = seed_account(&ctx, "bare@example.com", UserRole::Customer.id()).await;

    let view = ctx
        .services
        .accounts
        .find_by_id(id)
        .await
        .expect("lookup")
        .expect("view present");

    assert_eq!(view.fullname, "Unknown");
    assert_eq!(view.email, "bare@example.com");
    assert!(view.address.is_none());
    assert!(view.dob.is_none());
}

#[tokio::test]
async fn find_by_id_returns_profile_fields_when_present() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    let created = accounts
        .register("linh@example.com", "hash", "Linh Pham")
        .await
        .expect("register");

    let view = accounts
        .find_by_id(created.id)
        .await
        .expect("lookup")
        .expect("view present");

    assert_eq!(view.fullname, "Linh Pham");
    assert_eq!(view.role, Some(UserRole::Customer));
}

#[tokio::test]
async fn find_by_id_misses_unknown_account() {
    let ctx = TestContext::new().await;

    let view = ctx.services.accounts.find_by_id(4242).await.expect("lookup");

    assert!(view.is_none());
}

#[tokio::test]
async fn update_profile_applies_all_three_steps() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    let created = accounts
        .register("old@example.com", "hash", "Old Name")
        .await
        .expect("register");

    let updated = accounts
        .update_profile(UpdateProfileInput {
            id: created.id,
            email: "new@example.com".to_string(),
            phone: Some("0901234567".to_string()),
            name: "New Name".to_string(),
            address: Some("12 Flour St".to_string()),
            dob: Some(birthday()),
        })
        .await
        .expect("update profile");

    assert_eq!(updated.email, "new@example.com");
    assert_eq!(updated.fullname, "New Name");
    assert_eq!(updated.address.as_deref(), Some("12 Flour St"));

    let account = user_account::Entity::find_by_id(created.id)
        .one(&*ctx.db)
        .await
        .expect("query account")
        .expect("account present");
    assert_eq!(account.email, "new@example.com");
    assert!(account.updated_at.is_some());

    let profile = customer::Entity::find_by_id(created.id)
        .one(&*ctx.db)
        .await
        .expect("query profile")
        .expect("profile present");
    assert_eq!(profile.dob, Some(birthday()));
}

#[tokio::test]
async fn update_profile_without_dob_preserves_stored_dob() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    let created = accounts
        .register("keep@example.com", "hash", "Keeper")
        .await
        .expect("register");

    accounts
        .update_profile(UpdateProfileInput {
            id: created.id,
            email: "keep@example.com".to_string(),
            phone: None,
            name: "Keeper".to_string(),
            address: None,
            dob: Some(birthday()),
        })
        .await
        .expect("set dob");

    // Second update omits dob entirely; the stored date must survive.
    accounts
        .update_profile(UpdateProfileInput {
            id: created.id,
            email: "keep@example.com".to_string(),
            phone: Some("0987".to_string()),
            name: "Keeper Renamed".to_string(),
            address: Some("9 Rye Rd".to_string()),
            dob: None,
        })
        .await
        .expect("update without dob");

    let profile = customer::Entity::find_by_id(created.id)
        .one(&*ctx.db)
        .await
        .expect("query profile")
        .expect("profile present");

    assert_eq!(profile.fullname, "Keeper Renamed");
    assert_eq!(profile.dob, Some(birthday()));
}

#[tokio::test]
async fn update_profile_rolls_back_login_update_when_profile_is_missing() {
    let ctx = TestContext::new().await;
    // Customer login with no customer row: the login-table update succeeds
    // inside the transaction, then the profile step fails and everything
    // must roll back.
    let id = seed_account(&ctx, "torn@example.com", UserRole::Customer.id()).await;

    let result = ctx
        .services
        .accounts
        .update_profile(UpdateProfileInput {
            id,
            email: "changed@example.com".to_string(),
            phone: Some("0777".to_string()),
            name: "Torn".to_string(),
            address: None,
            dob: None,
        })
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));

    let account = user_account::Entity::find_by_id(id)
        .one(&*ctx.db)
        .await
        .expect("query account")
        .expect("account present");

    assert_eq!(account.email, "torn@example.com");
    assert!(account.updated_at.is_none());
}

#[tokio::test]
async fn employee_lookup_requires_both_rows() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    let id = seed_account(&ctx, "baker@example.com", UserRole::Employee.id()).await;

    // Login only: strict lookup misses.
    assert!(accounts
        .find_employee_by_id(id)
        .await
        .expect("lookup")
        .is_none());

    let profile = employee::ActiveModel {
        user_id: Set(id),
        fullname: Set("An Vo".to_string()),
        dob: Set(Some(birthday())),
        hire_date: Set(NaiveDate::from_ymd_opt(2023, 2, 1)),
        department: Set(Some("Pastry".to_string())),
        email: Set(Some("an.vo@bakeshop.local".to_string())),
        ..Default::default()
    };
    profile.insert(&*ctx.db).await.expect("seed employee");

    let view = accounts
        .find_employee_by_id(id)
        .await
        .expect("lookup")
        .expect("view present");

    assert_eq!(view.fullname, "An Vo");
    assert_eq!(view.login_email, "baker@example.com");
    assert_eq!(view.email.as_deref(), Some("an.vo@bakeshop.local"));
    assert_eq!(view.role, UserRole::Employee);
}

#[tokio::test]
async fn manager_lookup_requires_both_rows() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    let id = seed_account(&ctx, "boss@example.com", UserRole::Manager.id()).await;

    assert!(accounts
        .find_manager_by_id(id)
        .await
        .expect("lookup")
        .is_none());

    let profile = manager::ActiveModel {
        user_id: Set(id),
        fullname: Set("Quynh Dao".to_string()),
        department: Set(Some("Front of House".to_string())),
        ..Default::default()
    };
    profile.insert(&*ctx.db).await.expect("seed manager");

    let view = accounts
        .find_manager_by_id(id)
        .await
        .expect("lookup")
        .expect("view present");

    assert_eq!(view.fullname, "Quynh Dao");
    assert_eq!(view.email, "boss@example.com");
    assert_eq!(view.role, UserRole::Manager);
}

#[tokio::test]
async fn password_accessors_round_trip() {
    let ctx = TestContext::new().await;
    let accounts = &ctx.services.accounts;

    let created = accounts
        .register("pw@example.com", "hash-old", "Pat")
        .await
        .expect("register");

    let stored = accounts
        .get_password(created.id)
        .await
        .expect("get password");
    assert_eq!(stored.as_deref(), Some("hash-old"));

    accounts
        .change_password(created.id, "hash-new")
        .await
        .expect("change password");

    let stored = accounts
        .get_password(created.id)
        .await
        .expect("get password");
    assert_eq!(stored.as_deref(), Some("hash-new"));

    let account = user_account::Entity::find_by_id(created.id)
        .one(&*ctx.db)
        .await
        .expect("query account")
        .expect("account present");
    assert!(account.updated_at.is_some());
}

#[tokio::test]
async fn get_password_misses_unknown_account() {
    let ctx = TestContext::new().await;

    let stored = ctx
        .services
        .accounts
        .get_password(9999)
        .await
        .expect("get password");

    assert!(stored.is_none());
}
