mod common;

use std::collections::HashSet;

use cafe_booking::{
    commands::reservations::BookingOutcome,
    entities::{cafe_table, table_assignment, TableKind},
};
use common::{booking, date, TestApp};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

// The SQLite pool has a single connection, so these bookings queue on it
// rather than on row locks. The `row_locks_*` tests below race for real
// against Postgres.
#[tokio::test]
async fn one_bar_table_goes_to_exactly_one_guest() {
    let app = TestApp::new().await;
    let cafe = app.create_cafe("Crowded").await;
    let set = app.create_menu_set("Espresso").await;
    app.add_table(cafe.id, "Stool", TableKind::Bar, 1).await;
    let day = date(2024, 10, 1);

    let mut tasks = vec![];
    for _ in 0..20 {
        let svc = app.state.reservation_service.clone();
        let cmd = booking(cafe.id, set.id, day, 1);
        tasks.push(tokio::spawn(async move { svc.book_table(cmd).await }));
    }

    let mut booked = 0;
    let mut turned_away = 0;
    for t in tasks {
        match t.await.expect("task panicked") {
            Ok(BookingOutcome::Booked(_)) => booked += 1,
            Ok(BookingOutcome::NoAvailability) => turned_away += 1,
            Err(e) => panic!("unexpected booking error: {}", e),
        }
    }

    assert_eq!(booked, 1, "exactly one guest should get the stool; got {}", booked);
    assert_eq!(turned_away, 19);
    assert_eq!(app.count("reservations").await, 1);
    assert_eq!(app.count("table_assignments").await, 1);
}

#[tokio::test]
async fn merged_bookings_never_share_a_table() {
    let app = TestApp::new().await;
    let cafe = app.create_cafe("Merging").await;
    let set = app.create_menu_set("Lunch").await;
    for name in ["A", "B", "C", "D"] {
        app.add_table(cafe.id, name, TableKind::Simple, 2).await;
    }
    let day = date(2024, 10, 2);

    let mut tasks = vec![];
    for _ in 0..8 {
        let svc = app.state.reservation_service.clone();
        let cmd = booking(cafe.id, set.id, day, 3);
        tasks.push(tokio::spawn(async move { svc.book_table(cmd).await }));
    }

    let mut booked = 0;
    for t in tasks {
        if let Ok(BookingOutcome::Booked(_)) = t.await.expect("task panicked") {
            booked += 1;
        }
    }
    assert_eq!(booked, 2, "four 2-seat tables hold two parties of three; got {}", booked);

    let assignments = table_assignment::Entity::find()
        .all(app.db())
        .await
        .expect("load assignments");
    assert_eq!(assignments.len(), 4);
    let distinct: HashSet<_> = assignments.iter().map(|a| a.table_id).collect();
    assert_eq!(distinct.len(), assignments.len(), "a table was assigned twice");
}

async fn assignments_for_cafe(app: &TestApp, cafe_id: Uuid) -> Vec<table_assignment::Model> {
    let table_ids: Vec<Uuid> = cafe_table::Entity::find()
        .filter(cafe_table::Column::CafeId.eq(cafe_id))
        .all(app.db())
        .await
        .expect("load tables")
        .into_iter()
        .map(|t| t.id)
        .collect();

    table_assignment::Entity::find()
        .filter(table_assignment::Column::TableId.is_in(table_ids))
        .all(app.db())
        .await
        .expect("load assignments")
}

/// Connects to the server named by `DATABASE_URL` with a pool wide enough
/// for every task to hold its own transaction.
async fn postgres_app() -> Option<TestApp> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping row-lock race");
        return None;
    };
    Some(TestApp::with_database_url(&url, 24).await)
}

// These tests are ignored by default because they require a real Postgres database.
// Run with: DATABASE_URL=postgres://... cargo test -- --ignored row_locks
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn row_locks_keep_a_bar_table_to_one_guest() {
    let Some(app) = postgres_app().await else {
        return;
    };
    let cafe = app.create_cafe(&format!("Race {}", Uuid::new_v4())).await;
    let set = app.create_menu_set("Espresso").await;
    let stool = app.add_table(cafe.id, "Stool", TableKind::Bar, 1).await;
    let day = date(2024, 10, 3);

    let mut tasks = vec![];
    for _ in 0..20 {
        let svc = app.state.reservation_service.clone();
        let cmd = booking(cafe.id, set.id, day, 1);
        tasks.push(tokio::spawn(async move { svc.book_table(cmd).await }));
    }

    let mut booked = 0;
    let mut turned_away = 0;
    for t in tasks {
        match t.await.expect("task panicked") {
            Ok(BookingOutcome::Booked(_)) => booked += 1,
            Ok(BookingOutcome::NoAvailability) => turned_away += 1,
            Err(e) => panic!("unexpected booking error: {}", e),
        }
    }

    assert_eq!(booked, 1, "exactly one guest should get the stool; got {}", booked);
    assert_eq!(turned_away, 19);
    let assignments = assignments_for_cafe(&app, cafe.id).await;
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].table_id, stool.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn row_locks_keep_merged_tables_exclusive() {
    let Some(app) = postgres_app().await else {
        return;
    };
    let cafe = app.create_cafe(&format!("Merge race {}", Uuid::new_v4())).await;
    let set = app.create_menu_set("Lunch").await;
    for name in ["A", "B", "C", "D"] {
        app.add_table(cafe.id, name, TableKind::Simple, 2).await;
    }
    let day = date(2024, 10, 4);

    let mut tasks = vec![];
    for _ in 0..8 {
        let svc = app.state.reservation_service.clone();
        let cmd = booking(cafe.id, set.id, day, 3);
        tasks.push(tokio::spawn(async move { svc.book_table(cmd).await }));
    }

    let mut booked = 0;
    for t in tasks {
        match t.await.expect("task panicked") {
            Ok(BookingOutcome::Booked(_)) => booked += 1,
            Ok(BookingOutcome::NoAvailability) => {}
            Err(e) => panic!("unexpected booking error: {}", e),
        }
    }
    assert_eq!(booked, 2, "four 2-seat tables hold two parties of three; got {}", booked);

    let assignments = assignments_for_cafe(&app, cafe.id).await;
    assert_eq!(assignments.len(), 4);
    let distinct: HashSet<_> = assignments.iter().map(|a| a.table_id).collect();
    assert_eq!(distinct.len(), assignments.len(), "a table was assigned twice");
}
