use dockfix_lib::{ContainerHandle, Docker, FixtureError, FixtureSession, ImageSession};
use serial_test::serial;

use super::common::{CID, FakeDocker, registry, resources};

#[tokio::test]
#[serial]
async fn unavailable_engine_skips() {
  let fake = FakeDocker::new();
  fake.fail("ps", 1, "Cannot connect to the Docker daemon\n");
  let resources = resources();
  let registry = registry(resources.path());

  let mut session = FixtureSession::<ContainerHandle>::new(fake.docker(), &registry, "web::Sshd");
  let err = session.get().await.unwrap_err();

  assert!(matches!(err, FixtureError::EngineUnavailable));
  assert!(err.is_skip());
  assert!(fake.calls_to("build").is_empty());
  session.finish(false).await.unwrap();
}

#[tokio::test]
#[serial]
async fn remote_engine_skips_local_only() {
  let fake = FakeDocker::new();
  let docker = Docker::new(fake.config().with_host(Some("tcp://192.0.2.10:2376".into())));
  let resources = resources();
  let registry = registry(resources.path());

  let mut session = FixtureSession::<ContainerHandle>::new(docker, &registry, "web::Sshd").local_only();
  let err = session.get().await.unwrap_err();

  assert!(matches!(err, FixtureError::EngineNotLocal { ref host } if host == "192.0.2.10"));
  assert!(err.is_skip());
}

#[tokio::test]
#[serial]
async fn session_builds_starts_and_finishes() {
  let fake = FakeDocker::new();
  let resources = resources();
  let registry = registry(resources.path());

  let mut session = FixtureSession::<ContainerHandle>::new(fake.docker(), &registry, "web::Sshd");
  assert!(!session.is_started());

  let log = {
    let handle = session.get().await.unwrap();
    assert_eq!(handle.cid(), CID);
    handle.log_file().unwrap().to_path_buf()
  };
  assert!(log.file_name().unwrap().to_string_lossy().starts_with("docker-Sshd-run"));

  // Cached on later calls.
  session.get().await.unwrap();
  assert_eq!(fake.calls_to("build").len(), 2);
  assert_eq!(fake.calls_to("run").len(), 1);

  session.finish(true).await.unwrap();
  session.finish(true).await.unwrap();
  assert_eq!(fake.calls_to("rm"), [["rm", "-f", CID]]);
  assert!(!log.exists());
}

#[tokio::test]
#[serial]
async fn failed_build_keeps_session_unstarted() {
  let fake = FakeDocker::new();
  fake.fail("build", 2, "no space left on device\n");
  let resources = resources();
  let registry = registry(resources.path());

  let mut session = FixtureSession::<ContainerHandle>::new(fake.docker(), &registry, "web::Sshd");
  let err = session.get().await.unwrap_err();

  assert!(matches!(err, FixtureError::BuildFailed { code: Some(2), .. }));
  assert!(!session.is_started());
  assert!(fake.calls_to("run").is_empty());
  session.finish(true).await.unwrap();
}

#[tokio::test]
#[serial]
async fn image_session_builds_once() {
  let fake = FakeDocker::new();
  let resources = resources();
  let registry = registry(resources.path());

  let mut session = ImageSession::<ContainerHandle>::new(fake.docker(), &registry, "web::Sshd");
  let tag = session.build().await.unwrap().tag().to_string();

  session.create().await.unwrap();
  session
    .create_with(|starter| starter.with_port_offset(Some(2000)))
    .await
    .unwrap();

  assert_eq!(fake.calls_to("build").len(), 2);
  let runs = fake.calls_to("run");
  assert_eq!(runs.len(), 2);
  assert_eq!(runs[0].last().unwrap(), &tag);
  assert_eq!(runs[1][3], "127.0.0.1:2022:22");
  assert_eq!(session.containers().len(), 2);

  session.close_all().await.unwrap();
  assert_eq!(fake.calls_to("rm").len(), 2);
  assert!(session.containers().is_empty());
}
