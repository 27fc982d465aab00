//! Config loading and the classify/build commands against a temp workspace.

mod helpers;

use helpers::{create_chroot_file, TestEnv};
use mixer::commands::{cmd_build_chroots, cmd_classify, ClassifyArgs};
use mixer::config::Config;
use mixer::swupd::{File, Manifest, Modifier, Status};
use mixer::trust::SigningPolicy;
use mixer::MixError;
use serial_test::serial;
use std::fs;

#[test]
#[serial]
fn test_config_env_override() {
    let env = TestEnv::new();
    let path = env.write_config(&[("CERT", "Swupd_Root.pem")]);

    std::env::set_var("MIXER_CERT", "/srv/mix/override.pem");
    let config = Config::load(Some(&path));
    std::env::remove_var("MIXER_CERT");

    let config = config.unwrap();
    assert_eq!(config.cert, std::path::PathBuf::from("/srv/mix/override.pem"));
    assert_eq!(config.bundle_dir, env.workspace.join("mix-bundles"));
    assert_eq!(config.heuristics_dir, env.workspace);
    assert_eq!(config.signing_policy, SigningPolicy::ForceOnReuse);
}

#[test]
#[serial]
fn test_config_missing_file() {
    let env = TestEnv::new();
    let err = Config::load(Some(&env.workspace.join("nope.conf"))).unwrap_err();
    assert!(err.to_string().contains("Failed to read config"));
}

#[test]
#[serial]
fn test_classify_chroot_with_previous_manifest() {
    let env = TestEnv::new();
    env.write_scenario_lists();
    let config = Config::load(Some(&env.write_config(&[]))).unwrap();

    let chroot = env.workspace.join("full");
    create_chroot_file(&chroot, "etc/foo.conf", "a=1\n");
    create_chroot_file(&chroot, "var/lib/bar", "");
    create_chroot_file(&chroot, "boot/vmlinuz", "kernel");

    let previous_path = env.workspace.join("previous.json");
    let mut previous = Manifest::new("full", 10);
    previous.files.push(File::new("/etc/foo.conf"));
    previous.files.push(File::new("/tmp/old"));
    previous.save(&previous_path).unwrap();

    let output = env.workspace.join("Manifest.full.json");
    let manifest = cmd_classify(
        &config,
        ClassifyArgs {
            chroot: chroot.clone(),
            previous: Some(previous_path),
            output: Some(output.clone()),
            name: None,
            version: 20,
        },
    )
    .unwrap();

    assert_eq!(manifest.name, "full");
    assert_eq!(manifest.find("/etc/foo.conf").unwrap().modifier, Modifier::Config);
    assert_eq!(manifest.find("/var/lib/bar").unwrap().modifier, Modifier::State);
    assert_eq!(manifest.find("/boot/vmlinuz").unwrap().modifier, Modifier::Boot);
    let old = manifest.find("/tmp/old").unwrap();
    assert_eq!(old.status, Status::Ghosted);
    assert_eq!(old.modifier, Modifier::None);

    assert_eq!(Manifest::load(&output).unwrap(), manifest);
}

#[test]
#[serial]
fn test_classify_does_not_write_on_failure() {
    let env = TestEnv::new();
    env.write_scenario_lists();
    let config = Config::load(Some(&env.write_config(&[]))).unwrap();

    let chroot = env.workspace.join("full");
    create_chroot_file(&chroot, "etc/foo.conf", "");
    let configdirs = env.workspace.join("configdirs");
    fs::remove_file(&configdirs).unwrap();
    fs::create_dir(&configdirs).unwrap();

    let output = env.workspace.join("out.json");
    let err = cmd_classify(
        &config,
        ClassifyArgs {
            chroot,
            previous: None,
            output: Some(output.clone()),
            name: None,
            version: 1,
        },
    )
    .unwrap_err();

    assert!(err.to_string().contains("classification incomplete"));
    assert!(!output.exists());
}

#[test]
#[serial]
fn test_build_chroots_bootstraps_then_reuses() {
    let env = TestEnv::new();
    // `true` stands in for the external chroot builder
    let path = env.write_config(&[("CERT", "keys/Swupd_Root.pem"), ("CHROOT_BUILDER", "true")]);
    let config = Config::load(Some(&path)).unwrap();

    cmd_build_chroots(&config, false).unwrap();
    let cert = fs::read_to_string(&config.cert).unwrap();
    assert!(cert.contains("BEGIN CERTIFICATE"));
    assert!(config.private_key.exists());

    // Reuse leaves the existing certificate alone
    cmd_build_chroots(&config, true).unwrap();
    assert_eq!(fs::read_to_string(&config.cert).unwrap(), cert);
}

#[test]
#[serial]
fn test_unsigned_first_build_leaves_no_certificate() {
    let env = TestEnv::new();
    let path = env.write_config(&[("CERT", "keys/Swupd_Root.pem"), ("CHROOT_BUILDER", "true")]);
    let config = Config::load(Some(&path)).unwrap();

    cmd_build_chroots(&config, true).unwrap();
    assert!(!config.cert.exists());
    assert!(!config.private_key.exists());

    // Next signed build still bootstraps
    cmd_build_chroots(&config, false).unwrap();
    assert!(fs::read_to_string(&config.cert).unwrap().contains("BEGIN CERTIFICATE"));
}

#[test]
#[serial]
fn test_build_chroots_failure_is_fatal() {
    let env = TestEnv::new();
    let path = env.write_config(&[("CHROOT_BUILDER", "false")]);
    let config = Config::load(Some(&path)).unwrap();

    let err = cmd_build_chroots(&config, false).unwrap_err();
    let mix = err.downcast_ref::<MixError>().expect("typed error");
    assert!(mix.is_fatal());
}
