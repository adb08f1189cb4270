use dockfix_lib::{ContainerHandle, FixtureContainer, FixtureDescriptor, FixtureError, FixtureType, Image, InitError};
use serial_test::serial;
use tempfile::TempDir;

use super::common::{CID, FakeDocker, wait_for_content};

fn sshd() -> FixtureType {
  FixtureType::new("web::Sshd").with_descriptor(FixtureDescriptor::new("sshd").with_ports(&[22]))
}

fn image() -> Image {
  Image::new("dockfix/sshd:0123456789ab")
}

#[tokio::test]
#[serial]
async fn starts_and_closes_once() {
  let fake = FakeDocker::new();
  let docker = fake.docker();
  let image = image();

  let mut handle: ContainerHandle = image.starter(&docker, &sshd()).unwrap().start().await.unwrap();

  assert_eq!(handle.cid(), CID);
  assert_eq!(
    fake.calls_to("run"),
    [["run", "-d", "-p", "127.0.0.1::22", "dockfix/sshd:0123456789ab"]]
  );
  assert_eq!(fake.calls_to("logs"), [["logs", "-f", CID]]);

  handle.close().await.unwrap();
  handle.close().await.unwrap();
  assert_eq!(fake.calls_to("rm"), [["rm", "-f", CID]]);
}

#[tokio::test]
#[serial]
async fn port_variants() {
  let fake = FakeDocker::new();
  let docker = fake.docker();
  let image = image();
  let fixture = FixtureType::new("Dns").with_descriptor(
    FixtureDescriptor::new("dns")
      .with_ports(&[8080])
      .with_udp_ports(&[53])
      .with_match_host_ports(true),
  );

  let mut matched: ContainerHandle = image.starter(&docker, &fixture).unwrap().start().await.unwrap();
  let mut offset: ContainerHandle = image
    .starter(&docker, &fixture)
    .unwrap()
    .with_port_offset(Some(1000))
    .with_ip_address("::1")
    .start()
    .await
    .unwrap();
  matched.close().await.unwrap();
  offset.close().await.unwrap();

  let runs = fake.calls_to("run");
  assert_eq!(runs[0][2..6], ["-p", "127.0.0.1:8080:8080", "-p", "127.0.0.1:53:53/udp"]);
  assert_eq!(runs[1][2..6], ["-p", "[::1]:9080:8080", "-p", "[::1]:1053:53/udp"]);
}

#[tokio::test]
#[serial]
async fn remote_bind_is_rejected_before_running() {
  let fake = FakeDocker::new();
  let docker = dockfix_lib::Docker::new(fake.config().with_host(Some("tcp://192.0.2.10:2376".into())));
  let image = image();
  let fixture =
    FixtureType::new("Open").with_descriptor(FixtureDescriptor::new("open").with_ports(&[80]).with_bind_ip("0.0.0.0"));

  let err = image
    .starter(&docker, &fixture)
    .unwrap()
    .start::<ContainerHandle>()
    .await
    .unwrap_err();

  assert!(matches!(err, FixtureError::RemoteBindNotSupported { .. }));
  assert!(fake.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn failed_run_carries_output() {
  let fake = FakeDocker::new();
  fake.respond("run", "");
  fake.fail("run", 125, "Unable to find image 'dockfix/sshd:0123456789ab' locally\n");
  let docker = fake.docker();
  let image = image();

  let err = image
    .starter(&docker, &sshd())
    .unwrap()
    .start::<ContainerHandle>()
    .await
    .unwrap_err();

  match err {
    FixtureError::LaunchFailed { code, cmd, output } => {
      assert_eq!(code, Some(125));
      assert!(cmd.contains("run -d"));
      assert!(output.contains("Unable to find image"));
    }
    other => panic!("unexpected error: {other}"),
  }
  assert!(fake.calls_to("logs").is_empty());
}

#[tokio::test]
#[serial]
async fn blank_run_output_is_no_container_id() {
  let fake = FakeDocker::new();
  fake.respond("run", "  \n");
  let docker = fake.docker();
  let image = image();

  let err = image
    .starter(&docker, &sshd())
    .unwrap()
    .start::<ContainerHandle>()
    .await
    .unwrap_err();

  assert!(matches!(err, FixtureError::NoContainerId { .. }));
}

#[tokio::test]
#[serial]
async fn container_output_goes_to_log() {
  let fake = FakeDocker::new();
  let docker = fake.docker();
  let image = image();
  let logs = TempDir::new().unwrap();
  let log = logs.path().join("docker-Sshd-run.log");

  let mut handle: ContainerHandle = image
    .starter(&docker, &sshd())
    .unwrap()
    .with_log(&log)
    .start()
    .await
    .unwrap();

  assert_eq!(wait_for_content(&log), "container output\n");
  assert_eq!(handle.log_file(), Some(log.as_path()));
  handle.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn handle_queries() {
  let fake = FakeDocker::new();
  fake.respond("ps", &format!("{}\n", &CID[..12]));
  let docker = fake.docker();
  let image = image();

  let mut handle: ContainerHandle = image.starter(&docker, &sshd()).unwrap().start().await.unwrap();

  assert!(handle.is_running().await.unwrap());
  assert_eq!(handle.port(22).await.unwrap(), 49153);
  assert_eq!(handle.ip_address(), "127.0.0.1");
  assert_eq!(fake.calls_to("port"), [["port", CID, "22/tcp"]]);

  handle.close().await.unwrap();
  assert!(!handle.is_running().await.unwrap());
}

struct Rejecting {
  handle: ContainerHandle,
}

impl FixtureContainer for Rejecting {
  fn from_handle(handle: ContainerHandle) -> Result<Self, InitError> {
    Err(InitError::new(handle, "sshd never became ready"))
  }

  fn handle(&self) -> &ContainerHandle {
    &self.handle
  }

  fn handle_mut(&mut self) -> &mut ContainerHandle {
    &mut self.handle
  }
}

#[tokio::test]
#[serial]
async fn rejected_handle_is_removed() {
  let fake = FakeDocker::new();
  let docker = fake.docker();
  let image = image();

  let err = image
    .starter(&docker, &sshd())
    .unwrap()
    .start::<Rejecting>()
    .await
    .err()
    .unwrap();

  match err {
    FixtureError::HandleInitFailed { cid, source } => {
      assert_eq!(cid, CID);
      assert_eq!(source.to_string(), "sshd never became ready");
    }
    other => panic!("unexpected error: {other}"),
  }
  assert_eq!(fake.calls_to("rm"), [["rm", "-f", CID]]);
}

#[tokio::test]
#[serial]
async fn network_from_config() {
  let fake = FakeDocker::new();
  let docker = dockfix_lib::Docker::new(fake.config().with_network(Some("fixtures".into())));
  let image = image();

  let mut handle: ContainerHandle = image.starter(&docker, &sshd()).unwrap().start().await.unwrap();
  handle.close().await.unwrap();

  assert_eq!(fake.calls_to("run")[0][2..4], ["--network", "fixtures"]);
}

#[tokio::test]
#[serial]
async fn dropped_handle_removes_container() {
  let fake = FakeDocker::new();
  let docker = fake.docker();
  let image = image();

  let handle: ContainerHandle = image.starter(&docker, &sshd()).unwrap().start().await.unwrap();
  drop(handle);

  assert_eq!(fake.calls_to("rm"), [["rm", "-f", CID]]);
}

#[tokio::test]
#[serial]
async fn unwritable_log_removes_container() {
  let fake = FakeDocker::new();
  let docker = fake.docker();
  let image = image();
  let logs = TempDir::new().unwrap();
  let log = logs.path().join("missing/docker-Sshd-run.log");

  let err = image
    .starter(&docker, &sshd())
    .unwrap()
    .with_log(&log)
    .start::<ContainerHandle>()
    .await
    .unwrap_err();

  assert!(matches!(err, FixtureError::Io(_)), "unexpected error: {err}");
  assert!(fake.calls_to("logs").is_empty());
  assert_eq!(fake.calls_to("rm"), [["rm", "-f", CID]]);
}
