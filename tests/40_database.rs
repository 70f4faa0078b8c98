//! Runs against a real Postgres when `TEST_DATABASE_URL` is set; otherwise
//! every test reports itself as skipped and returns early.

mod common;

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use common::{get_request, json_request, send, session_for, test_config};
use kingdoms_api::auth;
use kingdoms_api::blacklist::MemoryBlacklist;
use kingdoms_api::database::models::{ApplicationState, KingdomInput, Role, User};
use kingdoms_api::database::{self, ApplicationRepository, KingdomRepository, UserRepository};
use kingdoms_api::filter::ApplicationFilter;
use kingdoms_api::services::{ApplicationError, ApplicationService};
use kingdoms_api::AppState;

async fn test_pool(test: &str) -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("skipping {}: TEST_DATABASE_URL is not set", test);
        return Ok(None);
    };
    let mut config = test_config().database;
    config.url = Some(url);
    config.connection_timeout = 5;
    let pool = database::connect_lazy(&config)?;
    database::run_migrations(&pool).await?;
    Ok(Some(pool))
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

async fn new_user(pool: &PgPool, role: Role) -> Result<User> {
    let hash = auth::hash_password("password")?;
    Ok(UserRepository::new(pool.clone()).create(&unique("user"), &hash, role).await?)
}

fn db_state(pool: &PgPool) -> AppState {
    let config = test_config();
    let blacklist = Arc::new(MemoryBlacklist::new(&config.redis.key_prefix));
    AppState::new(pool.clone(), blacklist, config)
}

async fn new_kingdom(pool: &PgPool) -> Result<i32> {
    let input = KingdomInput {
        name: unique("Kingdom"),
        area: 500,
        capital: "Camelot".into(),
        image: String::new(),
        description: String::new(),
        state: "Data confirmed".into(),
    };
    Ok(KingdomRepository::new(pool.clone()).create(&input).await?.id)
}

#[tokio::test]
async fn application_lifecycle() -> Result<()> {
    let Some(pool) = test_pool("application_lifecycle").await? else { return Ok(()) };

    let buyer = new_user(&pool, Role::Buyer).await?;
    let moderator = new_user(&pool, Role::Manager).await?;
    let kingdom = new_kingdom(&pool).await?;
    let service = ApplicationService::new(ApplicationRepository::new(pool.clone()));

    let view = service
        .create_with_kingdom(&buyer, kingdom, date(2024, 1, 1), date(2024, 12, 31))
        .await?;
    let id = view.application.id;
    assert_eq!(view.application.state(), ApplicationState::Draft);
    assert_eq!(view.kingdoms.len(), 1);

    // A second kingdom lands in the same draft.
    let second = new_kingdom(&pool).await?;
    let view = service
        .create_with_kingdom(&buyer, second, date(2025, 1, 1), date(2025, 2, 1))
        .await?;
    assert_eq!(view.application.id, id);
    assert_eq!(view.kingdoms.len(), 2);

    let duplicate = service
        .add_kingdom(&buyer, id, second, date(2025, 1, 1), date(2025, 2, 1))
        .await;
    assert!(matches!(duplicate, Err(ApplicationError::Database(database::DatabaseError::Conflict(_)))));

    service.update_ruler(&buyer, id, "Arthur").await?;
    service.remove_kingdom(&buyer, id, second).await?;

    let approved_early = service
        .change_state_as_moderator(&moderator, id, ApplicationState::Approved)
        .await;
    assert!(matches!(approved_early, Err(ApplicationError::InvalidTransition { .. })));

    let submitted = service
        .change_state_as_creator(&buyer, id, ApplicationState::Submitted)
        .await?;
    assert!(submitted.date_send.is_some());

    let edit_after_submit = service.update_ruler(&buyer, id, "Mordred").await;
    assert!(matches!(edit_after_submit, Err(ApplicationError::NotDraft)));

    let approved = service
        .change_state_as_moderator(&moderator, id, ApplicationState::Approved)
        .await?;
    assert_eq!(approved.state(), ApplicationState::Approved);
    assert_eq!(approved.moderator_refer, Some(moderator.id));
    assert!(approved.date_complete.is_some());

    let mut filter = ApplicationFilter::new();
    filter.status(Some("Approved"))?;
    let listed = service.list_all(&filter).await?;
    assert!(listed.iter().any(|app| app.id == id));

    let checked = service.record_check(id, true).await?;
    assert!(checked.checked);
    Ok(())
}

#[tokio::test]
async fn foreign_application_is_hidden() -> Result<()> {
    let Some(pool) = test_pool("foreign_application_is_hidden").await? else { return Ok(()) };

    let owner = new_user(&pool, Role::Buyer).await?;
    let stranger = new_user(&pool, Role::Buyer).await?;
    let moderator = new_user(&pool, Role::Admin).await?;
    let kingdom = new_kingdom(&pool).await?;
    let service = ApplicationService::new(ApplicationRepository::new(pool.clone()));

    let id = service
        .create_with_kingdom(&owner, kingdom, date(2024, 3, 1), date(2024, 3, 2))
        .await?
        .application
        .id;

    assert!(matches!(service.visible(&stranger, id).await, Err(ApplicationError::NotOwner)));
    assert!(matches!(service.delete(&stranger, id).await, Err(ApplicationError::NotOwner)));
    assert_eq!(service.visible(&moderator, id).await?.id, id);

    let empty = service.remove_kingdom(&owner, id, kingdom).await?;
    assert!(empty.kingdoms.is_empty());
    assert!(matches!(
        service.change_state_as_creator(&owner, id, ApplicationState::Submitted).await,
        Err(ApplicationError::Empty)
    ));

    service.delete(&owner, id).await?;
    assert!(service.visible(&owner, id).await.is_err());
    Ok(())
}

#[tokio::test]
async fn signup_login_and_kingdom_crud_over_http() -> Result<()> {
    let Some(pool) = test_pool("signup_login_and_kingdom_crud_over_http").await? else { return Ok(()) };

    let state = db_state(&pool);
    let name = unique("signup");

    let request = json_request("POST", "/signup", json!({"name": name, "pass": "pw"}), None)?;
    let res = send(kingdoms_api::app(state.clone()), request).await?;
    assert_eq!(res.status, StatusCode::OK);

    let request = json_request("POST", "/signup", json!({"name": name, "pass": "pw"}), None)?;
    let res = send(kingdoms_api::app(state.clone()), request).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let request = json_request("POST", "/login", json!({"login": name, "password": "wrong"}), None)?;
    let res = send(kingdoms_api::app(state.clone()), request).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["Message"], "incorrect user data");

    let request = json_request("POST", "/login", json!({"login": name, "password": "pw"}), None)?;
    let res = send(kingdoms_api::app(state.clone()), request).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["Body"]["Role"], 1);
    let set_cookie = res
        .headers
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let cookie = set_cookie.split(';').next().unwrap_or_default().to_string();
    assert!(cookie.contains("=Bearer"));

    // Buyers cannot moderate.
    let kingdom = json!({"Name": unique("Realm"), "Area": 10, "Capital": "Town", "State": "Data confirmed"});
    let request = json_request("POST", "/kingdom/create", kingdom.clone(), Some(&cookie))?;
    let res = send(kingdoms_api::app(state.clone()), request).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["Message"], "insufficient rights to complete the request");

    let moderator = new_user(&pool, Role::Manager).await?;
    let (_, moderator_cookie) = session_for(&state, &moderator)?;
    let request = json_request("POST", "/kingdom/create", kingdom, Some(&moderator_cookie))?;
    let res = send(kingdoms_api::app(state.clone()), request).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["Code"], 200);
    let kingdom_id = res.body["Body"]["Id"].as_i64().unwrap_or_default();

    let request = json_request("DELETE", "/kingdom/delete", json!({"Id": kingdom_id}), Some(&moderator_cookie))?;
    let res = send(kingdoms_api::app(state.clone()), request).await?;
    assert_eq!(res.body["Body"]["State"], "Conquered");

    let res = send(
        kingdoms_api::app(state.clone()),
        get_request(&format!("/kingdom?Id={}", kingdom_id), None)?,
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = send(kingdoms_api::app(state.clone()), get_request("/kingdom?Id=-1", None)?).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = send(kingdoms_api::app(state), get_request("/kingdoms?Kingdom_name=zz-no-such-realm", Some(&cookie))?).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["Body"]["Kingdoms"], json!([]));
    assert_eq!(res.body["Body"]["Draft_Application"], 0);
    Ok(())
}

#[tokio::test]
async fn kingdom_dates_can_be_changed_in_a_draft() -> Result<()> {
    let Some(pool) = test_pool("kingdom_dates_can_be_changed_in_a_draft").await? else { return Ok(()) };

    let buyer = new_user(&pool, Role::Buyer).await?;
    let kingdom = new_kingdom(&pool).await?;
    let service = ApplicationService::new(ApplicationRepository::new(pool.clone()));

    let id = service
        .create_with_kingdom(&buyer, kingdom, date(2024, 5, 1), date(2024, 5, 31))
        .await?
        .application
        .id;

    let view = service
        .update_kingdom(&buyer, id, kingdom, date(2024, 6, 1), date(2024, 6, 30))
        .await?;
    assert_eq!(view.kingdoms.len(), 1);
    assert_eq!(view.kingdoms[0].from, date(2024, 6, 1));
    assert_eq!(view.kingdoms[0].to, date(2024, 6, 30));

    let inverted = service
        .update_kingdom(&buyer, id, kingdom, date(2024, 7, 2), date(2024, 7, 1))
        .await;
    assert!(matches!(inverted, Err(ApplicationError::InvertedDates { .. })));

    let missing = service
        .update_kingdom(&buyer, id, new_kingdom(&pool).await?, date(2024, 6, 1), date(2024, 6, 2))
        .await;
    assert!(matches!(missing, Err(ApplicationError::Database(database::DatabaseError::NotFound(_)))));
    Ok(())
}

#[tokio::test]
async fn creator_can_withdraw_a_submitted_application() -> Result<()> {
    let Some(pool) = test_pool("creator_can_withdraw_a_submitted_application").await? else { return Ok(()) };

    let buyer = new_user(&pool, Role::Buyer).await?;
    let moderator = new_user(&pool, Role::Manager).await?;
    let kingdom = new_kingdom(&pool).await?;
    let service = ApplicationService::new(ApplicationRepository::new(pool.clone()));

    let id = service
        .create_with_kingdom(&buyer, kingdom, date(2024, 8, 1), date(2024, 8, 2))
        .await?
        .application
        .id;
    service.change_state_as_creator(&buyer, id, ApplicationState::Submitted).await?;

    let withdrawn = service
        .change_state_as_creator(&buyer, id, ApplicationState::Deleted)
        .await?;
    assert_eq!(withdrawn.state(), ApplicationState::Deleted);
    assert!(service.list_own(&buyer).await?.iter().all(|app| app.id != id));

    let late = service
        .change_state_as_moderator(&moderator, id, ApplicationState::Approved)
        .await;
    assert!(matches!(late, Err(ApplicationError::InvalidTransition { .. })));
    Ok(())
}

#[tokio::test]
async fn moderator_listing_filters_by_submission_date() -> Result<()> {
    let Some(pool) = test_pool("moderator_listing_filters_by_submission_date").await? else { return Ok(()) };

    let buyer = new_user(&pool, Role::Buyer).await?;
    let moderator = new_user(&pool, Role::Admin).await?;
    let service = ApplicationService::new(ApplicationRepository::new(pool.clone()));

    let submitted = service
        .create_with_kingdom(&buyer, new_kingdom(&pool).await?, date(2024, 9, 1), date(2024, 9, 2))
        .await?
        .application
        .id;
    service
        .change_state_as_creator(&buyer, submitted, ApplicationState::Submitted)
        .await?;

    let withdrawn = service
        .create_with_kingdom(&buyer, new_kingdom(&pool).await?, date(2024, 9, 1), date(2024, 9, 2))
        .await?
        .application
        .id;
    service
        .change_state_as_creator(&buyer, withdrawn, ApplicationState::Submitted)
        .await?;
    service
        .change_state_as_creator(&buyer, withdrawn, ApplicationState::Deleted)
        .await?;

    let draft = service
        .create_with_kingdom(&buyer, new_kingdom(&pool).await?, date(2024, 9, 1), date(2024, 9, 2))
        .await?
        .application
        .id;

    let state = db_state(&pool);
    let (_, cookie) = session_for(&state, &moderator)?;
    let today = Utc::now().date_naive();
    let around_today = format!(
        "/applications?All=true&From={}T00:00:00Z&To={}T23:59:59Z",
        today - Duration::days(2),
        today + Duration::days(2)
    );

    let res = send(kingdoms_api::app(state.clone()), get_request(&around_today, Some(&cookie))?).await?;
    assert_eq!(res.status, StatusCode::OK);
    let ids: Vec<i64> = res.body["Body"]
        .as_array()
        .map(|apps| apps.iter().filter_map(|app| app["Id"].as_i64()).collect())
        .unwrap_or_default();
    assert!(ids.contains(&(submitted as i64)));
    assert!(!ids.contains(&(withdrawn as i64)));
    assert!(!ids.contains(&(draft as i64)));

    let long_ago = "/applications?All=true&From=2000-01-01&To=2000-01-31";
    let res = send(kingdoms_api::app(state.clone()), get_request(long_ago, Some(&cookie))?).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["Body"]
        .as_array()
        .is_some_and(|apps| apps.iter().all(|app| app["Id"].as_i64() != Some(submitted as i64))));

    let bad_date = "/applications?All=true&From=yesterday";
    let res = send(kingdoms_api::app(state.clone()), get_request(bad_date, Some(&cookie))?).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    // One application by id still comes back as a list.
    let (_, buyer_cookie) = session_for(&state, &buyer)?;
    let res = send(
        kingdoms_api::app(state.clone()),
        get_request(&format!("/applications?Id={}", submitted), Some(&buyer_cookie))?,
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["Body"][0]["Id"], submitted);

    // Anything other than the literal `true` means the caller's own list.
    let res = send(kingdoms_api::app(state.clone()), get_request("/applications?All=1", Some(&buyer_cookie))?).await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = send(kingdoms_api::app(state), get_request("/applications?All=true", Some(&buyer_cookie))?).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["Message"], "insufficient rights to complete the request");
    Ok(())
}

#[tokio::test]
async fn async_callback_records_the_check() -> Result<()> {
    let Some(pool) = test_pool("async_callback_records_the_check").await? else { return Ok(()) };

    let buyer = new_user(&pool, Role::Buyer).await?;
    let service = ApplicationService::new(ApplicationRepository::new(pool.clone()));
    let id = service
        .create_with_kingdom(&buyer, new_kingdom(&pool).await?, date(2024, 10, 1), date(2024, 10, 2))
        .await?
        .application
        .id;
    service.change_state_as_creator(&buyer, id, ApplicationState::Submitted).await?;

    let state = db_state(&pool);
    let mut request = json_request("PUT", "/async/application", json!({"Id": id, "Check": true}), None)?;
    request
        .headers_mut()
        .insert("AsyncKey", state.config.async_service.key.parse()?);
    let res = send(kingdoms_api::app(state), request).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["Message"], "application updated successfully");

    assert!(service.visible(&buyer, id).await?.checked);
    Ok(())
}

#[tokio::test]
async fn bulk_insert_spans_several_batches() -> Result<()> {
    let Some(pool) = test_pool("bulk_insert_spans_several_batches").await? else { return Ok(()) };

    let kingdoms: Vec<KingdomInput> = (0..2_500)
        .map(|i| KingdomInput {
            name: unique(&format!("Bulk{}", i)),
            area: i,
            capital: "Harbor".into(),
            image: String::new(),
            description: String::new(),
            state: "Data lost".into(),
        })
        .collect();

    let repo = KingdomRepository::new(pool.clone());
    assert_eq!(repo.insert_many(&kingdoms).await?, 2_500);
    assert_eq!(repo.insert_many(&kingdoms[..1_200]).await?, 0);
    Ok(())
}
