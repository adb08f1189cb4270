use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_prints_tag() {
  let env = TestEnv::new();

  env
    .dockfix_cmd()
    .args(["build", "sshd"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built dockfix/sshd:"));

  let builds: Vec<_> = env.calls().into_iter().filter(|c| c.starts_with("build")).collect();
  assert_eq!(builds.len(), 2);
  assert!(builds[0].contains("dockfix/java:"));
  assert!(builds[1].contains("dockfix/sshd:"));
}

#[test]
fn no_cache_flag_reaches_engine() {
  let env = TestEnv::new();

  env.dockfix_cmd().args(["build", "java", "--no-cache"]).assert().success();

  assert!(env.calls().iter().any(|c| c.contains("--no-cache=true")));
}

#[test]
fn failed_build_dumps_log() {
  let env = TestEnv::new();
  env.respond("build", "Step 1/2 : FROM alpine\n");
  env.fail("build", 1, "pull access denied\n");

  env
    .dockfix_cmd()
    .args(["build", "sshd"])
    .assert()
    .failure()
    .stdout(predicate::str::contains("---%<--- docker-Sshd-build"))
    .stdout(predicate::str::contains("pull access denied"))
    .stderr(predicate::str::contains("failed to build image"));
}

#[test]
fn build_log_option_appends() {
  let env = TestEnv::new();
  env.respond("build", "Successfully built 0123456789ab\n");
  let log = env.temp.path().join("build.log");

  env
    .dockfix_cmd()
    .args(["build", "sshd", "--log"])
    .arg(&log)
    .assert()
    .success();

  let content = std::fs::read_to_string(&log).unwrap();
  assert_eq!(content.matches("Successfully built").count(), 2);
}

#[test]
fn unknown_fixture_fails() {
  let env = TestEnv::new();

  env
    .dockfix_cmd()
    .args(["build", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no such docker fixture found: nope"));
}

#[test]
fn unavailable_engine_fails_available() {
  let env = TestEnv::new();
  env.fail("ps", 1, "Cannot connect to the Docker daemon\n");

  env.dockfix_cmd().arg("available").assert().code(1);
}

#[test]
fn available_with_fake_engine() {
  let env = TestEnv::new();

  env
    .dockfix_cmd()
    .arg("available")
    .assert()
    .success()
    .stdout(predicate::str::contains("docker is available on 127.0.0.1"));
}

#[test]
fn available_local_rejects_remote_engine() {
  let env = TestEnv::new();

  env
    .dockfix_cmd()
    .env("DOCKER_HOST", "tcp://192.0.2.10:2376")
    .args(["available", "--local"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("192.0.2.10"));
}
