//! End-to-end tests for the `ship` binary.
//!
//! `/bin/echo` stands in for every external tool, so each tool invocation
//! shows up on stdout as its argument line.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NETWORKING_TEMPLATE: &str = "# {{FullyQualifiedName}} in {{AWSRegion}}{{AWSAZ1}}\n";
const KOPS_TEMPLATE: &str = "vpc: {{VPCID}}\nsubnet: {{NodeSubnetID}}\n";

const STATE: &str = r#"{
    "version": 3,
    "modules": [
        {
            "path": ["root"],
            "resources": {
                "aws_vpc.test": { "primary": { "id": "test-vpc-id" } },
                "aws_nat_gateway.public-eu-west-2a": { "primary": { "id": "test-nat-gateway-id" } },
                "aws_subnet.nodes-eu-west-2a": { "primary": { "id": "test-nodes-subnet-id" } },
                "aws_subnet.public-eu-west-2a": { "primary": { "id": "test-public-subnet-id" } }
            }
        }
    ]
}"#;

fn values(kops: &str, master_max: &str) -> String {
    format!(
        r"paths:
  terraform: /bin/echo
  kops: {kops}
  outputDir: .
  terraformTemplatePath: networking.tf.template
  kopsTemplatePath: kops.yaml.template
  sshPublicKeyPath: id_rsa.pub
clusterConfig:
  FullyQualifiedName: test.aws.testcompany.tech
  ShortName: test
  ConfigBaseURL: s3://testcompany-kops-config
  AWSRegion: eu-west-2
  AWSAZ1: a
  MasterMachineType: t2.small
  MasterMinNumber: 1
  MasterMaxNumber: {master_max}
  NodeMachineType: m4.large
  NodeMinNumber: 2
  NodeMaxNumber: 2
  BastionMachineType: t2.micro
  BastionMinNumber: 1
  BastionMaxNumber: 1
"
    )
}

fn workspace_with(values: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("values.yaml"), values).unwrap();
    std::fs::write(root.join("networking.tf.template"), NETWORKING_TEMPLATE).unwrap();
    std::fs::write(root.join("kops.yaml.template"), KOPS_TEMPLATE).unwrap();
    std::fs::write(root.join("id_rsa.pub"), "ssh-rsa AAAA test").unwrap();
    std::fs::write(root.join("terraform.tfstate"), STATE).unwrap();
    dir
}

fn workspace() -> TempDir {
    workspace_with(&values("/bin/echo", "1"))
}

fn ship(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.current_dir(dir)
        .env_remove("SHIP_VALUES")
        .env("NO_COLOR", "1");
    cmd
}

/// Assert every line appears in `stdout`, in the given order.
fn assert_in_order(stdout: &[u8], lines: &[&str]) {
    let stdout = String::from_utf8_lossy(stdout);
    let mut rest = stdout.as_ref();
    for line in lines {
        match rest.find(line) {
            Some(at) => rest = &rest[at + line.len()..],
            None => panic!("missing or out of order: {line:?}\n--- stdout ---\n{stdout}"),
        }
    }
}

#[test]
fn test_create_invokes_tools_in_order() {
    let dir = workspace();

    let output = ship(dir.path()).arg("create").assert().success();

    assert_in_order(
        &output.get_output().stdout,
        &[
            "apply -state=./terraform.tfstate .",
            "create -f ./kops.config --state s3://testcompany-kops-config",
            "create secret --name test.aws.testcompany.tech sshpublickey admin -i id_rsa.pub --state s3://testcompany-kops-config",
            "update cluster --name test.aws.testcompany.tech --state s3://testcompany-kops-config --yes",
        ],
    );

    let networking = std::fs::read_to_string(dir.path().join("networking.tf")).unwrap();
    assert_eq!(networking, "# test.aws.testcompany.tech in eu-west-2a\n");
    let kops = std::fs::read_to_string(dir.path().join("kops.config")).unwrap();
    assert_eq!(kops, "vpc: test-vpc-id\nsubnet: test-nodes-subnet-id\n");
}

#[test]
fn test_update_with_yes_rolls_nodes() {
    let dir = workspace();

    let output = ship(dir.path()).args(["update", "--yes"]).assert().success();

    assert_in_order(
        &output.get_output().stdout,
        &[
            "apply -state=./terraform.tfstate .",
            "replace cluster -f ./kops.config --state s3://testcompany-kops-config",
            "update cluster --name test.aws.testcompany.tech --state s3://testcompany-kops-config --yes",
            "rolling-update cluster --name test.aws.testcompany.tech --state s3://testcompany-kops-config",
        ],
    );
}

#[test]
fn test_destroy_with_yes() {
    let dir = workspace();

    let output = ship(dir.path()).args(["destroy", "--yes"]).assert().success();

    assert_in_order(
        &output.get_output().stdout,
        &[
            "delete cluster test.aws.testcompany.tech --state s3://testcompany-kops-config --yes",
            "destroy -force .",
        ],
    );
}

#[test]
fn test_destroy_without_terminal_does_nothing() {
    let dir = workspace();

    ship(dir.path())
        .arg("destroy")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("delete cluster").not())
        .stderr(predicate::str::contains("Destroy cluster failed"));
}

#[test]
fn test_missing_binary_override() {
    let dir = workspace_with(&values("/mock/please_not_a_real_bin", "1"));

    ship(dir.path())
        .arg("create")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("apply").not())
        .stderr(predicate::str::contains("Config validation failed"))
        .stderr(predicate::str::contains(
            "kops binary not found at /mock/please_not_a_real_bin",
        ));
}

#[test]
fn test_string_master_max_number_is_rejected() {
    let dir = workspace_with(&values("/bin/echo", "\"2\""));

    ship(dir.path())
        .arg("create")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("apply").not())
        .stderr(predicate::str::contains("Config validation failed"));
}

#[test]
fn test_values_path_flag() {
    let dir = workspace();
    std::fs::rename(dir.path().join("values.yaml"), dir.path().join("prod.yaml")).unwrap();

    ship(dir.path()).arg("create").assert().failure().code(1);

    ship(dir.path())
        .args(["--values", "prod.yaml", "create"])
        .assert()
        .success();

    ship(dir.path())
        .env("SHIP_VALUES", "prod.yaml")
        .arg("create")
        .assert()
        .success();
}

#[test]
fn test_uninstall_with_nothing_installed() {
    let dir = tempfile::tempdir().unwrap();

    ship(dir.path())
        .args(["uninstall", "--yes", "--helm", "/bin/echo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No platform releases installed"));
}

#[test]
fn test_install_times_out_waiting_for_workload() {
    let dir = tempfile::tempdir().unwrap();

    let output = ship(dir.path())
        .args([
            "install",
            "-d",
            "test.aws.testcompany.tech",
            "--helm",
            "/bin/echo",
            "--kubectl",
            "/bin/echo",
            "--poll-interval-secs",
            "0",
            "--wait-timeout-secs",
            "0",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Timed out after 0s waiting for deployment infra/kong-postgres",
        ));

    assert_in_order(
        &output.get_output().stdout,
        &[
            "repo add sprinthive-dev-charts https://s3.eu-west-2.amazonaws.com/sprinthive-dev-charts",
            "install stable/heapster -n sysmetric --namespace kube-system --set rbac.create=true",
            "install sprinthive-dev-charts/zipkin -n tracing --namespace infra --set ingress.enabled=true --set ingress.host=zipkin.test.aws.testcompany.tech",
        ],
    );
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();

    ship(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("install"));
}
