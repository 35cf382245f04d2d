use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mockall::Sequence;
use mockall::mock;
use tempfile::TempDir;
use unifier_build::PatchError;
use unifier_cli::{PipelineError, Stage, run_pipeline};
use unifier_core::{Config, TagStrategy};
use unifier_docker::{DockerClient, DockerError, DockerExecutor, Invocation};

mock! {
    Executor {}

    impl DockerExecutor for Executor {
        fn is_available(&self, program: &str) -> bool;
        async fn run(&self, invocation: &Invocation) -> Result<(), DockerError>;
    }
}

const FINAL_DOCKERFILE: &str = "FROM demo_unificado:old\nCMD [\"serve\"]\n";
const FINAL_COMPOSE: &str = "services:\n  app:\n    image: demo_unificado:old\n";

/// base/demo (unified + api + worker) and base/demo_final.
fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let files = [
        ("demo/Dockerfile", "FROM api\n"),
        ("demo/api/Dockerfile", "FROM alpine\n"),
        ("demo/worker/Dockerfile", "FROM alpine\n"),
        ("demo/docs/index.md", "# docs\n"),
        ("demo_final/Dockerfile", FINAL_DOCKERFILE),
        ("demo_final/docker-compose.yml", FINAL_COMPOSE),
    ];
    for (rel, content) in files {
        let path = tmp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    tmp
}

fn config(base: &Path) -> Config {
    Config {
        registry: "reg.example/ns".to_owned(),
        tag_strategy: TagStrategy::Date,
        date_tag: "24-01-01".to_owned(),
        ..Config::for_dirs(base, base.join("demo"), base.join("demo_final"))
    }
}

fn available() -> MockExecutor {
    let mut mock = MockExecutor::new();
    mock.expect_is_available().return_const(true);
    mock
}

/// Every file under `root` with its bytes.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, out);
            } else {
                out.insert(path.clone(), std::fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, &mut out);
    out
}

fn read(path: PathBuf) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ── Full run ──

#[tokio::test]
async fn full_run_issues_commands_in_order_and_patches_files() {
    let tmp = fixture();
    let cfg = config(tmp.path());

    let mut mock = available();
    let mut seq = Sequence::new();
    let expected: [&[&str]; 5] = [
        &["build", "-t", "api", "."],
        &["build", "-t", "worker", "."],
        &["build", "-t", "demo_unificado:24-01-01", "."],
        &["tag", "demo_unificado:24-01-01", "reg.example/ns/demo:24-01-01"],
        &["push", "reg.example/ns/demo:24-01-01"],
    ];
    for args in expected {
        mock.expect_run()
            .times(1)
            .in_sequence(&mut seq)
            .withf(move |inv| inv.args == args)
            .returning(|_| Ok(()));
    }

    let client = DockerClient::with_executor(mock, &cfg);
    let outcome = run_pipeline(&cfg, &client).await.unwrap();

    assert_eq!(
        outcome.stages,
        vec![
            Stage::ToolChecked,
            Stage::StructureValidated,
            Stage::Built,
            Stage::FilesUpdated,
            Stage::Published,
        ]
    );
    assert_eq!(outcome.commands.len(), 5);
    assert_eq!(outcome.unified_ref, "demo_unificado:24-01-01");
    assert_eq!(outcome.target_ref, "reg.example/ns/demo:24-01-01");

    assert_eq!(
        read(tmp.path().join("demo_final/Dockerfile")),
        "FROM demo_unificado:24-01-01\nCMD [\"serve\"]\n"
    );
    assert_eq!(
        read(tmp.path().join("demo_final/docker-compose.yml")),
        "services:\n  app:\n    image: demo_unificado:24-01-01\n"
    );
}

#[tokio::test]
async fn base_builds_run_inside_component_dirs() {
    let tmp = fixture();
    let cfg = Config {
        skip_update_files: true,
        do_push: false,
        ..config(tmp.path())
    };
    let demo = tmp.path().join("demo");

    let mut mock = available();
    let api = demo.join("api");
    mock.expect_run()
        .times(1)
        .withf(move |inv| inv.cwd.as_deref() == Some(api.as_path()))
        .returning(|_| Ok(()));
    let worker = demo.join("worker");
    mock.expect_run()
        .times(1)
        .withf(move |inv| inv.cwd.as_deref() == Some(worker.as_path()))
        .returning(|_| Ok(()));
    let root = demo.clone();
    mock.expect_run()
        .times(1)
        .withf(move |inv| inv.cwd.as_deref() == Some(root.as_path()))
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock, &cfg);
    run_pipeline(&cfg, &client).await.unwrap();
}

// ── Dry run ──

#[tokio::test]
async fn dry_run_leaves_filesystem_byte_identical() {
    let tmp = fixture();
    let cfg = Config {
        dry_run: true,
        ..config(tmp.path())
    };
    let before = snapshot(tmp.path());

    let mut mock = available();
    mock.expect_run().never();

    let client = DockerClient::with_executor(mock, &cfg);
    let outcome = run_pipeline(&cfg, &client).await.unwrap();

    assert_eq!(snapshot(tmp.path()), before);
    assert_eq!(outcome.commands.len(), 5);
    assert!(!outcome.file_update.unwrap().written);
}

#[tokio::test]
async fn dry_run_still_requires_the_tool() {
    let tmp = fixture();
    let cfg = Config {
        dry_run: true,
        ..config(tmp.path())
    };

    let mut mock = MockExecutor::new();
    mock.expect_is_available().return_const(false);
    mock.expect_run().never();

    let client = DockerClient::with_executor(mock, &cfg);
    let result = run_pipeline(&cfg, &client).await;

    assert!(matches!(
        result,
        Err(PipelineError::Docker(DockerError::ToolNotFound { .. }))
    ));
}

// ── Skip flags ──

#[tokio::test]
async fn skip_build_still_updates_and_publishes() {
    let tmp = fixture();
    let cfg = Config {
        skip_build: true,
        ..config(tmp.path())
    };

    let mut mock = available();
    mock.expect_run()
        .withf(|inv| inv.subcommand() == Some("build"))
        .never();
    mock.expect_run()
        .times(2)
        .withf(|inv| matches!(inv.subcommand(), Some("tag" | "push")))
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock, &cfg);
    let outcome = run_pipeline(&cfg, &client).await.unwrap();

    assert!(outcome.stages.contains(&Stage::BuildSkipped));
    assert!(outcome.stages.contains(&Stage::FilesUpdated));
    assert!(outcome.stages.contains(&Stage::Published));
    assert!(read(tmp.path().join("demo_final/Dockerfile")).starts_with("FROM demo_unificado:24-01-01"));
}

#[tokio::test]
async fn skip_update_files_keeps_final_dir() {
    let tmp = fixture();
    let cfg = Config {
        skip_update_files: true,
        ..config(tmp.path())
    };

    let mut mock = available();
    mock.expect_run().times(5).returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock, &cfg);
    let outcome = run_pipeline(&cfg, &client).await.unwrap();

    assert!(outcome.file_update.is_none());
    assert!(outcome.stages.contains(&Stage::UpdateSkipped));
    assert_eq!(read(tmp.path().join("demo_final/Dockerfile")), FINAL_DOCKERFILE);
}

#[tokio::test]
async fn no_push_skips_tag_and_push() {
    let tmp = fixture();
    let cfg = Config {
        do_push: false,
        ..config(tmp.path())
    };

    let mut mock = available();
    mock.expect_run()
        .times(3)
        .withf(|inv| inv.subcommand() == Some("build"))
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock, &cfg);
    let outcome = run_pipeline(&cfg, &client).await.unwrap();

    assert_eq!(outcome.stages.last(), Some(&Stage::PublishSkipped));
}

#[tokio::test]
async fn everything_skipped_still_validates() {
    let tmp = fixture();
    let cfg = Config {
        skip_build: true,
        skip_update_files: true,
        do_push: false,
        ..config(tmp.path())
    };

    let mut mock = available();
    mock.expect_run().never();

    let client = DockerClient::with_executor(mock, &cfg);
    let outcome = run_pipeline(&cfg, &client).await.unwrap();

    assert_eq!(
        outcome.stages,
        vec![
            Stage::ToolChecked,
            Stage::StructureValidated,
            Stage::BuildSkipped,
            Stage::UpdateSkipped,
            Stage::PublishSkipped,
        ]
    );
    assert!(outcome.commands.is_empty());
}

// ── Failures ──

#[tokio::test]
async fn missing_files_stop_before_any_command() {
    let tmp = fixture();
    std::fs::remove_file(tmp.path().join("demo_final/docker-compose.yml")).unwrap();
    std::fs::remove_file(tmp.path().join("demo/Dockerfile")).unwrap();
    let cfg = config(tmp.path());

    let mut mock = available();
    mock.expect_run().never();

    let client = DockerClient::with_executor(mock, &cfg);
    let result = run_pipeline(&cfg, &client).await;

    let Err(PipelineError::Core(unifier_core::Error::MissingFiles { paths })) = result else {
        panic!("expected missing files");
    };
    assert_eq!(paths.len(), 2);
}

#[tokio::test]
async fn build_failure_aborts_before_file_update() {
    let tmp = fixture();
    let cfg = config(tmp.path());

    let mut mock = available();
    mock.expect_run()
        .times(1)
        .withf(|inv| inv.args.contains(&"api".to_owned()))
        .returning(|inv| {
            Err(DockerError::CommandFailed {
                command: inv.to_string(),
                code: Some(1),
            })
        });
    mock.expect_run().never();

    let client = DockerClient::with_executor(mock, &cfg);
    let result = run_pipeline(&cfg, &client).await;

    assert!(matches!(
        result,
        Err(PipelineError::Docker(DockerError::CommandFailed { code: Some(1), .. }))
    ));
    assert_eq!(read(tmp.path().join("demo_final/Dockerfile")), FINAL_DOCKERFILE);
}

#[tokio::test]
async fn missing_image_anchor_leaves_both_files_and_skips_push() {
    let tmp = fixture();
    let compose = "services:\n  app:\n    build: .\n";
    std::fs::write(tmp.path().join("demo_final/docker-compose.yml"), compose).unwrap();
    let cfg = Config {
        skip_build: true,
        ..config(tmp.path())
    };

    let mut mock = available();
    mock.expect_run().never();

    let client = DockerClient::with_executor(mock, &cfg);
    let result = run_pipeline(&cfg, &client).await;

    assert!(matches!(
        result,
        Err(PipelineError::Patch(PatchError::NoImageLine))
    ));
    assert_eq!(read(tmp.path().join("demo_final/Dockerfile")), FINAL_DOCKERFILE);
    assert_eq!(read(tmp.path().join("demo_final/docker-compose.yml")), compose);
}

#[tokio::test]
async fn project_without_components_builds_only_unified_image() {
    let tmp = fixture();
    std::fs::remove_dir_all(tmp.path().join("demo/api")).unwrap();
    std::fs::remove_dir_all(tmp.path().join("demo/worker")).unwrap();
    let cfg = Config {
        skip_update_files: true,
        do_push: false,
        ..config(tmp.path())
    };

    let mut mock = available();
    mock.expect_run()
        .times(1)
        .withf(|inv| inv.args.contains(&"demo_unificado:24-01-01".to_owned()))
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock, &cfg);
    let outcome = run_pipeline(&cfg, &client).await.unwrap();
    assert_eq!(outcome.commands.len(), 1);
}
