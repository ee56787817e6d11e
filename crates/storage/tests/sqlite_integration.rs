use chrono::Duration;
use lingo_core::model::{
    Difficulty, ProgressUpdate, QuizRecord, QuizSummary, TermFilter, UserId,
};
use lingo_core::time::fixed_now;
use storage::repository::{
    ProfileRepository, QuizHistoryRepository, Storage, StorageError, TermRepository,
};
use storage::seed::builtin_terms;
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrips_builtin_terms() {
    let repo = connect("memdb_terms").await;
    for term in builtin_terms().unwrap() {
        repo.upsert_term(&term).await.unwrap();
    }
    assert_eq!(repo.count_terms().await.unwrap(), 12);

    let docker = repo.get_term(lingo_core::model::TermId::new(3)).await.unwrap();
    assert_eq!(docker.name(), "Docker");
    assert_eq!(docker.category(), "DevOps");
    assert!(docker.code_example().unwrap().contains("FROM node:18"));

    let devops = repo
        .list_terms(&TermFilter::all().with_category("DevOps"))
        .await
        .unwrap();
    let names: Vec<&str> = devops.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["Docker", "Git", "CI/CD"]);

    let hard_devops = repo
        .list_terms(
            &TermFilter::all()
                .with_category("DevOps")
                .with_difficulty(Difficulty::Advanced),
        )
        .await
        .unwrap();
    assert_eq!(hard_devops.len(), 1);
    assert_eq!(hard_devops[0].name(), "CI/CD");
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_rejects_duplicate_term_names() {
    let repo = connect("memdb_term_conflict").await;
    let terms = builtin_terms().unwrap();
    repo.upsert_term(&terms[0]).await.unwrap();

    let mut clash = terms[1].to_draft();
    clash.name = terms[0].name().to_owned();
    let clash = clash.validate(terms[1].id(), fixed_now()).unwrap();
    let err = repo.upsert_term(&clash).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_profiles_and_leaderboard_order() {
    let repo = connect("memdb_profiles").await;
    let now = fixed_now();
    let mut ninja = repo.create_profile("DevNinja", now).await.unwrap();
    let mut guru = repo.create_profile("TechGuru", now).await.unwrap();
    let _wizard = repo.create_profile("ByteWizard", now).await.unwrap();

    assert!(matches!(
        repo.create_profile("DevNinja", now).await.unwrap_err(),
        StorageError::Conflict
    ));

    ninja.apply_progress(ProgressUpdate {
        xp_earned: 50,
        streak: 2,
    });
    guru.apply_progress(ProgressUpdate {
        xp_earned: 50,
        streak: 5,
    });
    repo.save_profile(&ninja).await.unwrap();
    repo.save_profile(&guru).await.unwrap();

    let top = repo.top_profiles(10).await.unwrap();
    let names: Vec<&str> = top.iter().map(|p| p.username()).collect();
    assert_eq!(names, vec!["DevNinja", "TechGuru", "ByteWizard"]);

    let found = repo.find_by_username("TechGuru").await.unwrap().unwrap();
    assert_eq!(found.current_streak(), 5);
    assert!(repo.find_by_username("Nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_history_keeps_filter_and_orders_newest_first() {
    let repo = connect("memdb_history").await;
    let now = fixed_now();
    let user = repo.create_profile("StackPro", now).await.unwrap();

    let older = QuizRecord::new(
        user.id(),
        TermFilter::all().with_category("Database"),
        QuizSummary::new(3, 2, 25, 2),
        now,
        now + Duration::minutes(2),
    )
    .unwrap();
    let newer = QuizRecord::new(
        user.id(),
        TermFilter::all().with_difficulty(Difficulty::Beginner),
        QuizSummary::new(5, 5, 70, 5),
        now + Duration::minutes(10),
        now + Duration::minutes(12),
    )
    .unwrap();

    let older_id = repo.append_record(&older).await.unwrap();
    let newer_id = repo.append_record(&newer).await.unwrap();

    let recent = repo.list_recent(user.id(), 20).await.unwrap();
    let ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer_id, older_id]);

    let fetched = repo.get_record(older_id).await.unwrap();
    assert_eq!(fetched.record, older);
    assert_eq!(fetched.record.filter().category.as_deref(), Some("Database"));

    assert_eq!(repo.list_recent(user.id(), 1).await.unwrap().len(), 1);
    assert!(repo.list_for_user(UserId::new(999)).await.unwrap().is_empty());
}

#[tokio::test]
async fn storage_facade_wires_sqlite_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_facade?mode=memory&cache=shared")
        .await
        .expect("storage");
    assert_eq!(storage.terms.count_terms().await.unwrap(), 0);
    let profile = storage
        .profiles
        .create_profile("CodeMaster", fixed_now())
        .await
        .unwrap();
    assert_eq!(
        storage.profiles.get_profile(profile.id()).await.unwrap(),
        profile
    );
}
