use chrono::Utc;
use tempfile::TempDir;

use launcher_protocols::{
    ExecutionMode, JobSpec, JobStore, JobUpdate, LogQuery, NewLogEntry, Project,
    ProjectRegistry, RunMetadata, RunResult, RunStatus, Trigger,
};

use crate::{
    FileJobStore, FileProjectRegistry, LOGS_FILE, MemoryJobStore, MemoryProjectRegistry,
    SCHEDULES_FILE,
};

fn spec(project_id: &str, index: usize) -> JobSpec {
    JobSpec::new(project_id, index, "echo hi", "/tmp", "Proj", "*/5 * * * *")
}

fn log(schedule_id: Option<&str>, command: &str) -> NewLogEntry {
    let now = Utc::now();
    NewLogEntry {
        schedule_id: schedule_id.map(str::to_string),
        project_name: "Proj".to_string(),
        command_name: String::new(),
        command: command.to_string(),
        trigger: if schedule_id.is_some() {
            Trigger::Scheduled
        } else {
            Trigger::Manual
        },
        mode: ExecutionMode::Silent,
        result: RunResult {
            start_time: now,
            end_time: now,
            duration_ms: 5,
            exit_code: Some(0),
            stdout: "ok".to_string(),
            stderr: String::new(),
            status: RunStatus::Success,
        },
    }
}

#[tokio::test]
async fn test_memory_store_create_and_get() {
    let store = MemoryJobStore::new();
    let created = store
        .create_job(spec("p1", 0).with_notify(true).with_timeout_minutes(5))
        .await
        .unwrap();

    let loaded = store.get_job(&created.id).await.unwrap().unwrap();
    assert_eq!(loaded, created);
    assert!(loaded.notify_on_complete);
    assert_eq!(loaded.timeout_minutes, 5);
    assert!(loaded.last_run_at.is_none());

    assert_eq!(store.list_jobs().await.unwrap().len(), 1);
    assert!(store.get_job("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_job_for_command() {
    let store = MemoryJobStore::new();
    store.create_job(spec("p1", 0)).await.unwrap();
    let second = store.create_job(spec("p1", 1)).await.unwrap();

    let found = store.find_job_for_command("p1", 1).await.unwrap().unwrap();
    assert_eq!(found.id, second.id);
    assert!(store.find_job_for_command("p1", 2).await.unwrap().is_none());
    assert!(store.find_job_for_command("p2", 0).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_job_merges_fields() {
    let store = MemoryJobStore::new();
    let job = store.create_job(spec("p1", 0)).await.unwrap();

    let update = JobUpdate::enabled(false).with_cron_expression("0 9 * * *");
    let updated = store.update_job(&job.id, update).await.unwrap();

    assert!(!updated.enabled);
    assert_eq!(updated.cron_expression, "0 9 * * *");
    assert_eq!(updated.command, job.command);
    assert_eq!(updated.created_at, job.created_at);
}

#[tokio::test]
async fn test_update_missing_job_is_not_found() {
    let store = MemoryJobStore::new();
    let err = store
        .update_job("nope", JobUpdate::enabled(true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_run_metadata_on_missing_job_is_noop() {
    let store = MemoryJobStore::new();
    let meta = RunMetadata {
        last_run_at: Utc::now(),
        last_exit_code: Some(1),
    };
    store.update_job_run_metadata("gone", meta).await.unwrap();
    assert!(store.list_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_metadata_updates_only_metadata() {
    let store = MemoryJobStore::new();
    let job = store.create_job(spec("p1", 0)).await.unwrap();
    let meta = RunMetadata {
        last_run_at: Utc::now(),
        last_exit_code: Some(3),
    };
    store.update_job_run_metadata(&job.id, meta).await.unwrap();

    let loaded = store.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(loaded.last_exit_code, Some(3));
    assert_eq!(loaded.last_run_at, Some(meta.last_run_at));
    assert_eq!(loaded.cron_expression, job.cron_expression);
}

#[tokio::test]
async fn test_delete_job_and_project() {
    let store = MemoryJobStore::new();
    let a = store.create_job(spec("p1", 0)).await.unwrap();
    store.create_job(spec("p1", 1)).await.unwrap();
    store.create_job(spec("p2", 0)).await.unwrap();

    assert!(store.delete_job(&a.id).await.unwrap());
    assert!(!store.delete_job(&a.id).await.unwrap());

    assert_eq!(store.delete_jobs_for_project("p1").await.unwrap(), 1);
    assert_eq!(store.delete_jobs_for_project("p1").await.unwrap(), 0);

    let remaining = store.list_jobs().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].project_id, "p2");
}

#[tokio::test]
async fn test_log_cap_keeps_newest() {
    let store = MemoryJobStore::new();
    for i in 0..501 {
        store.append_log(log(None, &format!("cmd-{}", i))).await.unwrap();
    }

    let page = store
        .list_logs(&LogQuery::default().with_limit(1000))
        .await
        .unwrap();
    assert_eq!(page.total, 500);
    assert_eq!(page.logs[0].command, "cmd-500");
    assert_eq!(page.logs[499].command, "cmd-1");
}

#[tokio::test]
async fn test_log_pagination_and_filter() {
    let store = MemoryJobStore::with_max_logs(100);
    for i in 0..10 {
        let schedule = if i % 2 == 0 { Some("s1") } else { None };
        store
            .append_log(log(schedule, &format!("cmd-{}", i)))
            .await
            .unwrap();
    }

    let page = store
        .list_logs(&LogQuery::default().with_limit(3).with_offset(2))
        .await
        .unwrap();
    assert_eq!(page.total, 10);
    let commands: Vec<_> = page.logs.iter().map(|e| e.command.as_str()).collect();
    assert_eq!(commands, vec!["cmd-7", "cmd-6", "cmd-5"]);

    let filtered = store.list_logs(&LogQuery::for_schedule("s1")).await.unwrap();
    assert_eq!(filtered.total, 5);
    assert!(
        filtered
            .logs
            .iter()
            .all(|e| e.schedule_id.as_deref() == Some("s1"))
    );

    let past_end = store
        .list_logs(&LogQuery::default().with_offset(50))
        .await
        .unwrap();
    assert_eq!(past_end.total, 10);
    assert!(past_end.logs.is_empty());
}

#[tokio::test]
async fn test_clear_logs_by_schedule_and_all() {
    let store = MemoryJobStore::new();
    store.append_log(log(Some("s1"), "a")).await.unwrap();
    store.append_log(log(Some("s2"), "b")).await.unwrap();
    store.append_log(log(None, "c")).await.unwrap();

    assert_eq!(store.clear_logs(Some("s1")).await.unwrap(), 1);
    assert_eq!(store.list_logs(&LogQuery::default()).await.unwrap().total, 2);

    assert_eq!(store.clear_logs(None).await.unwrap(), 2);
    assert_eq!(store.list_logs(&LogQuery::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let created = {
        let store = FileJobStore::new(temp_dir.path()).await.unwrap();
        let job = store
            .create_job(spec("p1", 0).with_command_name("Build"))
            .await
            .unwrap();
        store.append_log(log(Some(&job.id), "echo hi")).await.unwrap();
        job
    };

    assert!(temp_dir.path().join(SCHEDULES_FILE).exists());
    assert!(temp_dir.path().join(LOGS_FILE).exists());

    let store = FileJobStore::new(temp_dir.path()).await.unwrap();
    let loaded = store.get_job(&created.id).await.unwrap().unwrap();
    assert_eq!(loaded, created);

    let page = store
        .list_logs(&LogQuery::for_schedule(created.id.clone()))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.logs[0].stdout, "ok");
}

#[tokio::test]
async fn test_file_store_update_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileJobStore::new(temp_dir.path()).await.unwrap();
    let job = store.create_job(spec("p1", 0)).await.unwrap();

    store
        .update_job(&job.id, JobUpdate::enabled(false))
        .await
        .unwrap();
    let reopened = FileJobStore::new(temp_dir.path()).await.unwrap();
    assert!(!reopened.get_job(&job.id).await.unwrap().unwrap().enabled);

    assert!(reopened.delete_job(&job.id).await.unwrap());
    assert!(store.list_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_store_log_cap() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileJobStore::new(temp_dir.path())
        .await
        .unwrap()
        .with_max_logs(3);
    for i in 0..5 {
        store.append_log(log(None, &format!("cmd-{}", i))).await.unwrap();
    }
    let page = store.list_logs(&LogQuery::default()).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.logs[0].command, "cmd-4");
}

#[tokio::test]
async fn test_file_store_corrupt_file_reads_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(SCHEDULES_FILE), "{not json").unwrap();
    std::fs::write(temp_dir.path().join(LOGS_FILE), "").unwrap();

    let store = FileJobStore::new(temp_dir.path()).await.unwrap();
    assert!(store.list_jobs().await.unwrap().is_empty());
    assert_eq!(store.list_logs(&LogQuery::default()).await.unwrap().total, 0);

    store.create_job(spec("p1", 0)).await.unwrap();
    assert_eq!(store.list_jobs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_store_creates_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");
    let store = FileJobStore::new(&nested).await.unwrap();
    assert!(nested.is_dir());
    assert_eq!(store.data_dir(), nested.as_path());
}

#[tokio::test]
async fn test_file_project_registry() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("projects.json");
    let json = serde_json::json!([
        { "id": "p1", "name": "One", "path": "/tmp/one", "commands": ["make"] },
        { "id": "p2", "name": "Two", "path": "/tmp/two", "default_command": "ls" }
    ]);
    std::fs::write(&path, json.to_string()).unwrap();

    let registry = FileProjectRegistry::new(&path);
    let projects = registry.list_projects().await;
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].commands, vec!["ls".to_string()]);

    assert!(registry.is_registered_path("/tmp/one").await);
    assert!(!registry.is_registered_path("/tmp/three").await);
    assert_eq!(registry.get_project("p2").await.unwrap().name, "Two");
}

#[tokio::test]
async fn test_file_project_registry_missing_or_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("projects.json");

    let registry = FileProjectRegistry::new(&path);
    assert!(registry.list_projects().await.is_empty());

    std::fs::write(&path, "garbage").unwrap();
    assert!(registry.list_projects().await.is_empty());
}

#[tokio::test]
async fn test_memory_project_registry() {
    let registry = MemoryProjectRegistry::default();
    assert!(registry.list_projects().await.is_empty());

    registry
        .insert(Project {
            id: "p1".to_string(),
            name: "P".to_string(),
            path: "/tmp".to_string(),
            commands: vec!["make".to_string()],
            command_names: Vec::new(),
            command_modes: Vec::new(),
            default_command: None,
            result_path: String::new(),
            order: None,
        })
        .await;

    let project = registry.get_project("p1").await.unwrap();
    assert_eq!(project.command_mode(0), ExecutionMode::Terminal);
}
