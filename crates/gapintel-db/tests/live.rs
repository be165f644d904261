//! Live integration tests for gapintel-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. `"../../migrations"` is relative to `crates/gapintel-db/`.

use gapintel_core::{ReportStatus, Tier};
use gapintel_db::{
    create_folder, create_report_within_quota, delete_folder, delete_report, get_report,
    get_report_status, get_subscription, list_folders, list_reports, move_report_to_folder,
    reset_monthly_usage, update_report_status, upsert_subscription, DbError, NewFolder,
    NewReport, SubscriptionUpdate,
};
use serde_json::json;

fn new_report<'a>(user_id: &'a str, channel: &'a str) -> NewReport<'a> {
    NewReport {
        user_id,
        channel_name: channel,
        channel_thumbnail: Some("https://yt3.ggpht.com/abc"),
        email: Some("creator@example.com"),
    }
}

async fn set_tier(pool: &sqlx::PgPool, user_id: &str, tier: Tier) {
    upsert_subscription(
        pool,
        &SubscriptionUpdate {
            user_id,
            email: None,
            tier,
            status: "active",
            stripe_customer_id: Some("cus_test"),
            stripe_subscription_id: Some("sub_test"),
            current_period_end: None,
        },
    )
    .await
    .expect("upsert_subscription failed");
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_report_starts_pending_and_counts_usage(pool: sqlx::PgPool) {
    let row = create_report_within_quota(&pool, &new_report("user_a", "Bread Lab"))
        .await
        .expect("create report");

    assert_eq!(row.status, "pending");
    assert!(row.report_data.is_none());
    assert_eq!(row.channel_thumbnail.as_deref(), Some("https://yt3.ggpht.com/abc"));

    let sub = get_subscription(&pool, "user_a")
        .await
        .expect("get_subscription")
        .expect("subscription row created on first report");
    assert_eq!(sub.tier, "free");
    assert_eq!(sub.analyses_this_month, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn free_tier_quota_is_enforced(pool: sqlx::PgPool) {
    create_report_within_quota(&pool, &new_report("user_a", "First"))
        .await
        .expect("first report fits");

    let err = create_report_within_quota(&pool, &new_report("user_a", "Second"))
        .await
        .expect_err("second report exceeds free quota");
    assert!(matches!(err, DbError::QuotaExceeded { used: 1, limit: 1 }));

    let rows = list_reports(&pool, "user_a", None, 50).await.expect("list");
    assert_eq!(rows.len(), 1, "rejected report must not be inserted");
}

#[sqlx::test(migrations = "../../migrations")]
async fn enterprise_tier_is_unlimited(pool: sqlx::PgPool) {
    set_tier(&pool, "user_e", Tier::Enterprise).await;
    for i in 0..25 {
        create_report_within_quota(&pool, &new_report("user_e", &format!("Channel {i}")))
            .await
            .expect("enterprise never hits quota");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn reports_are_scoped_to_their_owner(pool: sqlx::PgPool) {
    let row = create_report_within_quota(&pool, &new_report("owner", "Mine"))
        .await
        .expect("create");

    assert!(matches!(
        get_report(&pool, "intruder", row.id).await,
        Err(DbError::NotFound)
    ));
    assert!(matches!(
        delete_report(&pool, "intruder", row.id).await,
        Err(DbError::NotFound)
    ));
    assert!(list_reports(&pool, "intruder", None, 50)
        .await
        .expect("list")
        .is_empty());

    delete_report(&pool, "owner", row.id).await.expect("delete");
    assert!(matches!(
        get_report(&pool, "owner", row.id).await,
        Err(DbError::NotFound)
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn status_lifecycle_pending_processing_completed(pool: sqlx::PgPool) {
    let row = create_report_within_quota(&pool, &new_report("user_a", "Bread Lab"))
        .await
        .expect("create");

    update_report_status(&pool, row.id, ReportStatus::Processing, None, None)
        .await
        .expect("pending -> processing");

    let data = json!({ "pipeline_stats": { "raw_comments": 100 } });
    update_report_status(&pool, row.id, ReportStatus::Completed, Some(&data), None)
        .await
        .expect("processing -> completed");

    let status = get_report_status(&pool, "user_a", row.id)
        .await
        .expect("status");
    assert_eq!(status.parsed_status().expect("parse"), ReportStatus::Completed);

    let full = get_report(&pool, "user_a", row.id).await.expect("get");
    assert_eq!(full.report_data, Some(data));

    let err = update_report_status(&pool, row.id, ReportStatus::Failed, None, Some("late"))
        .await
        .expect_err("terminal states never transition");
    assert!(matches!(
        err,
        DbError::InvalidStatusTransition {
            to: ReportStatus::Failed,
            ..
        }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn pending_can_fail_directly(pool: sqlx::PgPool) {
    let row = create_report_within_quota(&pool, &new_report("user_a", "Bread Lab"))
        .await
        .expect("create");

    update_report_status(&pool, row.id, ReportStatus::Failed, None, Some("quota"))
        .await
        .expect("pending -> failed");

    let status = get_report_status(&pool, "user_a", row.id)
        .await
        .expect("status");
    assert_eq!(status.status, "failed");
    assert_eq!(status.error_message.as_deref(), Some("quota"));
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn folders_filter_reports_and_unfile_on_delete(pool: sqlx::PgPool) {
    set_tier(&pool, "user_a", Tier::Pro).await;
    let folder = create_folder(
        &pool,
        "user_a",
        &NewFolder {
            name: "Clients",
            color: None,
            icon: Some("briefcase"),
        },
    )
    .await
    .expect("create folder");
    assert_eq!(folder.color, "#6366f1");

    let filed = create_report_within_quota(&pool, &new_report("user_a", "Filed"))
        .await
        .expect("create");
    create_report_within_quota(&pool, &new_report("user_a", "Loose"))
        .await
        .expect("create");

    move_report_to_folder(&pool, "user_a", filed.id, Some(folder.id))
        .await
        .expect("move");

    let in_folder = list_reports(&pool, "user_a", Some(folder.id), 50)
        .await
        .expect("list");
    assert_eq!(in_folder.len(), 1);
    assert_eq!(in_folder[0].channel_name, "Filed");

    delete_folder(&pool, "user_a", folder.id)
        .await
        .expect("delete folder");
    let report = get_report(&pool, "user_a", filed.id).await.expect("get");
    assert!(report.folder_id.is_none(), "report falls back to unfiled");
    assert!(list_folders(&pool, "user_a").await.expect("list").is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_folder_name_is_rejected(pool: sqlx::PgPool) {
    let folder = NewFolder {
        name: "Clients",
        color: None,
        icon: None,
    };
    create_folder(&pool, "user_a", &folder).await.expect("first");
    let err = create_folder(&pool, "user_a", &folder)
        .await
        .expect_err("duplicate");
    assert!(matches!(err, DbError::Duplicate));

    create_folder(&pool, "user_b", &folder)
        .await
        .expect("same name for another user is fine");
}

#[sqlx::test(migrations = "../../migrations")]
async fn cannot_move_into_another_users_folder(pool: sqlx::PgPool) {
    let foreign = create_folder(
        &pool,
        "user_b",
        &NewFolder {
            name: "Theirs",
            color: None,
            icon: None,
        },
    )
    .await
    .expect("create folder");
    let row = create_report_within_quota(&pool, &new_report("user_a", "Mine"))
        .await
        .expect("create");

    assert!(matches!(
        move_report_to_folder(&pool, "user_a", row.id, Some(foreign.id)).await,
        Err(DbError::NotFound)
    ));
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn monthly_reset_clears_usage_but_keeps_tier(pool: sqlx::PgPool) {
    set_tier(&pool, "user_a", Tier::Starter).await;
    for name in ["One", "Two"] {
        create_report_within_quota(&pool, &new_report("user_a", name))
            .await
            .expect("create");
    }

    let touched = reset_monthly_usage(&pool).await.expect("reset");
    assert_eq!(touched, 1);

    let sub = get_subscription(&pool, "user_a")
        .await
        .expect("get")
        .expect("row");
    assert_eq!(sub.analyses_this_month, 0);
    assert_eq!(sub.parsed_tier().expect("tier"), Tier::Starter);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_preserves_usage(pool: sqlx::PgPool) {
    create_report_within_quota(&pool, &new_report("user_a", "One"))
        .await
        .expect("create");
    set_tier(&pool, "user_a", Tier::Pro).await;

    let sub = get_subscription(&pool, "user_a")
        .await
        .expect("get")
        .expect("row");
    assert_eq!(sub.tier, "pro");
    assert_eq!(sub.analyses_this_month, 1);
    assert_eq!(sub.email.as_deref(), Some("creator@example.com"));
}
