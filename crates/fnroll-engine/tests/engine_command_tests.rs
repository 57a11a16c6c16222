// Test suite for engine command orchestration
// Drives every command against a SQLite store in a scratch directory

use fnroll_core::errors::ExErrorKind;
use fnroll_core::logging_facility::test_capture::init_test_capture;
use fnroll_core::schema::{EVENT_END, EVENT_START};
use fnroll_core::{
    FunctionName, PollPolicy, RollbackOptions, RollbackSettings, Version, VersionStore,
};
use fnroll_core_types::CallContext;
use fnroll_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use fnroll_store::{FileFunctionLoader, SqliteVersionStore};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: SqliteVersionStore,
    loader: FileFunctionLoader,
    function_file: PathBuf,
    ctx: CallContext,
}

fn setup(name: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let function_file = dir.path().join("function.json");
    fs::write(
        &function_file,
        format!(
            r#"{{"FunctionName": "{name}", "Runtime": "provided.al2023", "Description": "{{{{ env "FN_DESC" "built locally" }}}}"}}"#
        ),
    )
    .unwrap();
    let store = SqliteVersionStore::open(dir.path().join("store.db")).unwrap();
    Fixture {
        _dir: dir,
        store,
        loader: FileFunctionLoader::with_env(|_| None),
        function_file,
        ctx: CallContext::new(),
    }
}

impl Fixture {
    fn apply(&self, cmd: EngineCommand) -> fnroll_store::Result<EngineCommandResult> {
        apply_engine_command(cmd, &self.store, &self.loader, &self.ctx)
    }

    fn publish(&self, times: usize) {
        for _ in 0..times {
            self.apply(EngineCommand::Publish {
                function_file: self.function_file.clone(),
                point_alias: true,
            })
            .unwrap();
        }
    }

    fn rollback(&self, dry_run: bool, delete_version: bool) -> EngineCommandResult {
        self.apply(EngineCommand::Rollback {
            options: RollbackOptions {
                function_file: self.function_file.clone(),
                dry_run,
                delete_version,
            },
            settings: RollbackSettings {
                poll: PollPolicy::fixed(Duration::from_millis(1)).with_max_attempts(10),
                ..RollbackSettings::default()
            },
        })
        .unwrap()
    }

    fn listing(&self) -> fnroll_engine::commands::versions::VersionListing {
        match self
            .apply(EngineCommand::ListVersions {
                function_file: self.function_file.clone(),
            })
            .unwrap()
        {
            EngineCommandResult::Versions(listing) => listing,
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

fn v(n: u64) -> Version {
    Version::new(n).unwrap()
}

#[test]
fn test_publish_records_digest_and_moves_alias() {
    let fx = setup("publish-me");

    let result = fx
        .apply(EngineCommand::Publish {
            function_file: fx.function_file.clone(),
            point_alias: true,
        })
        .unwrap();

    let EngineCommandResult::Published(published) = result else {
        panic!("expected publish result");
    };
    assert_eq!(published.published.version, "1");
    assert!(published.aliased);
    assert_eq!(
        published.published.description.as_deref(),
        Some("built locally")
    );
    assert_eq!(
        published.published.code_sha256.as_ref().map(String::len),
        Some(64)
    );
    assert_eq!(fx.listing().current.as_deref(), Some("1"));
}

#[test]
fn test_publish_without_alias_leaves_alias_alone() {
    let fx = setup("quiet-publish");
    fx.publish(1);

    fx.apply(EngineCommand::Publish {
        function_file: fx.function_file.clone(),
        point_alias: false,
    })
    .unwrap();

    let listing = fx.listing();
    assert_eq!(listing.current.as_deref(), Some("1"));
    assert_eq!(listing.versions.len(), 2);
}

#[test]
fn test_rollback_moves_alias_to_previous_version() {
    let fx = setup("roll-me");
    fx.publish(3);

    let EngineCommandResult::Rollback(outcome) = fx.rollback(false, false) else {
        panic!("expected rollback outcome");
    };

    assert_eq!(outcome.current_version, v(3));
    assert_eq!(outcome.previous_version, v(2));
    assert_eq!(outcome.deleted_version, None);
    let listing = fx.listing();
    assert_eq!(listing.current.as_deref(), Some("2"));
    assert_eq!(listing.versions.len(), 3);
}

#[test]
fn test_dry_run_rollback_changes_nothing() {
    let fx = setup("dry-roll");
    fx.publish(2);
    let before = fx.listing();

    let EngineCommandResult::Rollback(outcome) = fx.rollback(true, true) else {
        panic!("expected rollback outcome");
    };

    assert!(outcome.dry_run);
    assert_eq!(
        outcome.to_string(),
        "rolling back function dry-roll from version 2 to 1 **DRY RUN**"
    );
    assert_eq!(fx.listing(), before);
}

#[test]
fn test_rollback_with_delete_removes_rolled_back_version() {
    let fx = setup("roll-delete");
    fx.publish(3);

    let EngineCommandResult::Rollback(outcome) = fx.rollback(false, true) else {
        panic!("expected rollback outcome");
    };

    assert_eq!(outcome.deleted_version, Some(v(3)));
    let listing = fx.listing();
    let versions: Vec<_> = listing.versions.iter().map(|e| e.version).collect();
    assert_eq!(versions, vec![v(1), v(2)]);
    assert_eq!(listing.current.as_deref(), Some("2"));

    let EngineCommandResult::Rollback(again) = fx.rollback(false, false) else {
        panic!("expected rollback outcome");
    };
    assert_eq!(again.previous_version, v(1));
}

#[test]
fn test_rollback_of_single_version_fails_with_stable_code() {
    let fx = setup("lonely");
    fx.publish(1);

    let err = fx
        .apply(EngineCommand::Rollback {
            options: RollbackOptions {
                function_file: fx.function_file.clone(),
                dry_run: false,
                delete_version: false,
            },
            settings: RollbackSettings::default(),
        })
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NoPreviousVersion);
    assert_eq!(err.code(), "ERR_NO_PREVIOUS_VERSION");
    assert_eq!(err.request_id(), Some(&fx.ctx.request_id));
    assert!(err
        .to_string()
        .contains(&format!("(request: {})", fx.ctx.request_id)));
}

#[test]
fn test_missing_definition_error_carries_request_id() {
    let fx = setup("no-file");

    let err = fx
        .apply(EngineCommand::ListVersions {
            function_file: fx.function_file.with_file_name("absent.json"),
        })
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ConfigLoad);
    assert_eq!(err.request_id(), Some(&fx.ctx.request_id));
}

#[test]
fn test_rollback_without_alias_is_alias_read_error() {
    let fx = setup("unaliased");
    fx.apply(EngineCommand::Publish {
        function_file: fx.function_file.clone(),
        point_alias: false,
    })
    .unwrap();

    let err = fx
        .apply(EngineCommand::Rollback {
            options: RollbackOptions {
                function_file: fx.function_file.clone(),
                dry_run: true,
                delete_version: false,
            },
            settings: RollbackSettings::default(),
        })
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::AliasRead);
}

#[test]
fn test_set_alias_reports_previous_target() {
    let fx = setup("aliased");
    fx.publish(3);

    let result = fx
        .apply(EngineCommand::SetAlias {
            function_file: fx.function_file.clone(),
            alias: "current".to_string(),
            version: v(1),
        })
        .unwrap();

    let EngineCommandResult::AliasSet(set) = result else {
        panic!("expected alias result");
    };
    assert_eq!(set.previous.as_deref(), Some("3"));
    assert_eq!(set.version, v(1));
    let listing = fx.listing();
    assert!(listing.versions[0].current);
    assert!(!listing.versions[2].current);
}

#[test]
fn test_set_alias_to_missing_version_is_not_found() {
    let fx = setup("alias-missing");
    fx.publish(1);

    let err = fx
        .apply(EngineCommand::SetAlias {
            function_file: fx.function_file.clone(),
            alias: "staging".to_string(),
            version: v(7),
        })
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(
        fx.store
            .get_alias_target(&fx.ctx, &FunctionName::new("alias-missing").unwrap(), "staging")
            .unwrap_err()
            .kind(),
        fnroll_core::StoreErrorKind::NotFound
    );
}

#[test]
fn test_listing_of_unpublished_function_is_empty() {
    let fx = setup("nothing-yet");

    let listing = fx.listing();

    assert_eq!(listing.current, None);
    assert!(listing.versions.is_empty());
}

#[test]
fn test_publish_emits_start_and_end_events() {
    let capture = init_test_capture();
    let fx = setup("publish-logged");

    fx.publish(1);

    let events: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.op.as_deref() == Some("publish"))
        .filter(|e| e.field("request_id") == Some(fx.ctx.request_id.as_str()))
        .collect();
    assert!(events.iter().any(|e| e.event.as_deref() == Some(EVENT_START)));
    assert!(events.iter().any(|e| {
        e.event.as_deref() == Some(EVENT_END) && e.field("function_name") == Some("publish-logged")
    }));
}
