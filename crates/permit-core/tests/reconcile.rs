use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use permit_core::{
    Capability, GrantTable, Mode, Outcome, PermissionDescriptor, PermissionQuery,
    PermissionState, PermitConfig, PermitError, Reconciler, Spawner,
};
use serde_json::json;
use tempfile::TempDir;

/// Answers from a fixed list of granted descriptors, counting queries
#[derive(Default)]
struct FakeSandbox {
    granted: Vec<PermissionDescriptor>,
    queries: Cell<usize>,
}

impl FakeSandbox {
    fn granting(granted: Vec<PermissionDescriptor>) -> Self {
        Self {
            granted,
            ..Default::default()
        }
    }

    fn answer(&self, descriptor: PermissionDescriptor) -> PermissionState {
        self.queries.set(self.queries.get() + 1);
        if self.granted.contains(&descriptor) {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }
}

impl PermissionQuery for FakeSandbox {
    fn query_unscoped(&self, capability: Capability) -> PermissionState {
        self.answer(PermissionDescriptor::Unscoped(capability))
    }
    fn query_path(&self, capability: Capability, path: &str) -> PermissionState {
        self.answer(PermissionDescriptor::Path(capability, path.to_string()))
    }
    fn query_host(&self, host: &str) -> PermissionState {
        self.answer(PermissionDescriptor::Host(host.to_string()))
    }
    fn query_variable(&self, variable: &str) -> PermissionState {
        self.answer(PermissionDescriptor::Variable(variable.to_string()))
    }
    fn query_command(&self, command: &str) -> PermissionState {
        self.answer(PermissionDescriptor::Command(command.to_string()))
    }
    fn query_kind(&self, kind: &str) -> PermissionState {
        self.answer(PermissionDescriptor::Kind(kind.to_string()))
    }
    fn query_hrtime(&self) -> PermissionState {
        self.answer(PermissionDescriptor::Hrtime)
    }
}

/// Records the launch instead of spawning anything
struct FakeSpawner {
    exit_code: i32,
    launches: RefCell<Vec<(PathBuf, Vec<String>)>>,
}

impl FakeSpawner {
    fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            launches: RefCell::new(Vec::new()),
        }
    }
}

impl Spawner for FakeSpawner {
    fn spawn_and_wait(&self, program: &Path, args: &[String]) -> io::Result<i32> {
        self.launches
            .borrow_mut()
            .push((program.to_path_buf(), args.to_vec()));
        Ok(self.exit_code)
    }
}

struct FailingSpawner;

impl Spawner for FailingSpawner {
    fn spawn_and_wait(&self, _program: &Path, _args: &[String]) -> io::Result<i32> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.dir.path().join(name), content).unwrap();
    }

    fn write_json(&self, name: &str, value: serde_json::Value) {
        self.write(name, &serde_json::to_string_pretty(&value).unwrap());
    }

    fn config(&self, mode: Mode) -> PermitConfig {
        let candidates = ["deno.jsonc", "deno.json", "permissions.jsonc", "permissions.json"]
            .iter()
            .map(|name| self.dir.path().join(name))
            .collect();
        PermitConfig::for_home(Path::new("/home/ada"))
            .with_manifest_candidates(candidates)
            .with_mode(mode)
    }
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_report_read_denied_net_granted() {
    let ws = Workspace::new();
    ws.write_json(
        "deno.json",
        json!({"permissions": {"a.ts": {"read": ["/tmp"], "net": []}}}),
    );
    let config = ws.config(Mode::Report);
    let sandbox = FakeSandbox::granting(vec![PermissionDescriptor::Unscoped(Capability::Net)]);
    let spawner = FakeSpawner::exiting_with(0);

    let mut out = Vec::new();
    let outcome = Reconciler::new(&config, &sandbox, &spawner)
        .run(&args(&["a.ts"]), &mut out)
        .unwrap();

    let Outcome::Reported(reconciliation) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(reconciliation.full, vec!["--allow-read=/tmp", "--allow-net"]);
    assert_eq!(reconciliation.missing, vec!["--allow-read=/tmp"]);
    assert_eq!(sandbox.queries.get(), 2);
    assert!(spawner.launches.borrow().is_empty());

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("--allow-read=/tmp --allow-net\n"));
    assert!(printed.contains("Missing permissions:\n\n--allow-read=/tmp\n"));
}

#[test]
fn test_report_all_granted() {
    let ws = Workspace::new();
    ws.write_json("deno.json", json!({"permissions": {"a.ts": {"env": ["HOME"]}}}));
    let config = ws.config(Mode::Report);
    let sandbox = FakeSandbox::granting(vec![PermissionDescriptor::Variable("HOME".into())]);
    let spawner = FakeSpawner::exiting_with(0);

    let mut out = Vec::new();
    let outcome = Reconciler::new(&config, &sandbox, &spawner)
        .run(&args(&["a.ts"]), &mut out)
        .unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert!(String::from_utf8(out).unwrap().contains("All permissions granted"));
}

#[test]
fn test_scoped_query_count_and_minimal_flags() {
    let ws = Workspace::new();
    ws.write_json(
        "deno.json",
        json!({"permissions": {"a.ts": {"net": ["deno.land", "esm.sh:443", "localhost:8000"]}}}),
    );
    let config = ws.config(Mode::Report);
    let sandbox = FakeSandbox::granting(vec![PermissionDescriptor::Host("esm.sh:443".into())]);
    let spawner = FakeSpawner::exiting_with(0);

    let mut out = Vec::new();
    let outcome = Reconciler::new(&config, &sandbox, &spawner)
        .run(&args(&["a.ts"]), &mut out)
        .unwrap();

    let Outcome::Reported(reconciliation) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(sandbox.queries.get(), 3);
    assert_eq!(
        reconciliation.full,
        vec!["--allow-net=deno.land,esm.sh:443,localhost:8000"]
    );
    assert_eq!(
        reconciliation.missing,
        vec!["--allow-net=deno.land", "--allow-net=localhost:8000"]
    );
}

#[test]
fn test_launch_argv_and_exit_code() {
    let ws = Workspace::new();
    ws.write_json("deno.json", json!({"permissions": {"a.ts": {"env": []}}}));
    let config = ws.config(Mode::Launch);
    let sandbox = FakeSandbox::default();
    let spawner = FakeSpawner::exiting_with(3);

    let mut out = Vec::new();
    let outcome = Reconciler::new(&config, &sandbox, &spawner)
        .run(&args(&["a.ts", "--foo"]), &mut out)
        .unwrap();

    assert_eq!(outcome, Outcome::Exited(3));
    assert_eq!(outcome.exit_code(), 3);
    assert_eq!(sandbox.queries.get(), 0);
    assert!(out.is_empty());

    let launches = spawner.launches.borrow();
    assert_eq!(launches.len(), 1);
    let (program, argv) = &launches[0];
    assert_eq!(program, &PathBuf::from("/home/ada/.deno/bin/deno"));
    assert_eq!(argv, &args(&["run", "--allow-env", "a.ts", "--foo"]));
}

#[test]
fn test_launch_keeps_separator_arguments() {
    let ws = Workspace::new();
    ws.write_json("deno.json", json!({"permissions": {"a.ts": {"env": []}}}));
    let config = ws.config(Mode::Launch);
    let spawner = FakeSpawner::exiting_with(0);

    Reconciler::new(&config, &FakeSandbox::default(), &spawner)
        .run(&args(&["--", "a.ts", "--foo"]), &mut io::sink())
        .unwrap();

    assert_eq!(
        spawner.launches.borrow()[0].1,
        args(&["run", "--allow-env", "--", "a.ts", "--foo"])
    );
}

#[test]
fn test_launch_resolves_tokens() {
    let ws = Workspace::new();
    ws.write(
        "deno.jsonc",
        r#"{
            // generated by the build
            "permissions": {
                "tools/fmt.ts": {
                    "run": ["///<exec_path>"],
                    "read": ["///<cache_path>/deno", "."],
                },
            },
        }"#,
    );
    let config = ws.config(Mode::Launch);
    let spawner = FakeSpawner::exiting_with(0);

    let outcome = Reconciler::new(&config, &GrantTable::default(), &spawner)
        .run(&args(&["tools/fmt.ts"]), &mut io::sink())
        .unwrap();

    assert_eq!(outcome.exit_code(), 0);
    let launches = spawner.launches.borrow();
    assert_eq!(
        launches[0].1,
        args(&[
            "run",
            "--allow-run=/home/ada/.deno/bin/deno",
            "--allow-read=/home/ada/.cache/deno,.",
            "tools/fmt.ts",
        ])
    );
}

#[test]
fn test_no_manifest_anywhere() {
    let ws = Workspace::new();
    let config = ws.config(Mode::Report);
    let sandbox = FakeSandbox::default();
    let spawner = FakeSpawner::exiting_with(0);

    let err = Reconciler::new(&config, &sandbox, &spawner)
        .run(&args(&["a.ts"]), &mut io::sink())
        .unwrap_err();

    assert!(matches!(err, PermitError::ManifestNotFound));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(sandbox.queries.get(), 0);
    assert!(spawner.launches.borrow().is_empty());
}

#[test]
fn test_entry_missing_from_first_manifest_stops_scan() {
    let ws = Workspace::new();
    ws.write_json("deno.json", json!({"permissions": {"b.ts": {"net": []}}}));
    ws.write_json("permissions.json", json!({"permissions": {"a.ts": {"net": []}}}));
    let config = ws.config(Mode::Launch);
    let spawner = FakeSpawner::exiting_with(0);

    let err = Reconciler::new(&config, &FakeSandbox::default(), &spawner)
        .run(&args(&["a.ts"]), &mut io::sink())
        .unwrap_err();

    assert_eq!(err.exit_code(), 1);
    assert!(spawner.launches.borrow().is_empty());
}

#[test]
fn test_malformed_first_candidate_falls_through() {
    let ws = Workspace::new();
    ws.write("deno.jsonc", "{ \"permissions\": { \"a.ts\": ");
    ws.write_json("permissions.json", json!({"permissions": {"a.ts": {"hrtime": null}}}));
    let config = ws.config(Mode::Launch);
    let spawner = FakeSpawner::exiting_with(0);

    Reconciler::new(&config, &FakeSandbox::default(), &spawner)
        .run(&args(&["a.ts"]), &mut io::sink())
        .unwrap();

    assert_eq!(spawner.launches.borrow()[0].1, args(&["run", "--allow-hrtime", "a.ts"]));
}

#[test]
fn test_no_entry_script_argument() {
    let ws = Workspace::new();
    ws.write_json("deno.json", json!({"permissions": {"a.ts": {"net": []}}}));
    let config = ws.config(Mode::Launch);
    let spawner = FakeSpawner::exiting_with(0);

    let err = Reconciler::new(&config, &FakeSandbox::default(), &spawner)
        .run(&args(&["--foo"]), &mut io::sink())
        .unwrap_err();

    assert!(matches!(err, PermitError::ManifestNotFound));
}

#[test]
fn test_spawn_failure() {
    let ws = Workspace::new();
    ws.write_json("deno.json", json!({"permissions": {"a.ts": {"net": []}}}));
    let config = ws.config(Mode::Launch);

    let err = Reconciler::new(&config, &FakeSandbox::default(), &FailingSpawner)
        .run(&args(&["a.ts"]), &mut io::sink())
        .unwrap_err();

    assert!(matches!(err, PermitError::Spawn { .. }));
    assert_eq!(err.exit_code(), 127);
}

#[test]
fn test_report_against_grant_table() {
    let ws = Workspace::new();
    ws.write_json(
        "deno.json",
        json!({"permissions": {"a.ts": {
            "read": ["/tmp/cache", "/etc"],
            "net": ["deno.land:443"],
            "env": [],
        }}}),
    );
    let config = ws
        .config(Mode::Report)
        .with_granted(["--allow-read=/tmp", "--allow-net=deno.land"]);
    let grants = GrantTable::from_flags(&config.granted);
    let spawner = FakeSpawner::exiting_with(0);

    let outcome = Reconciler::new(&config, &grants, &spawner)
        .run(&args(&["a.ts"]), &mut io::sink())
        .unwrap();

    let Outcome::Reported(reconciliation) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(reconciliation.missing, vec!["--allow-read=/etc", "--allow-env"]);
}
