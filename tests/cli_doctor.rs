mod common;

#[test]
fn test_cli_doctor_exits_zero() {
    let td = tempfile::tempdir().expect("tmpdir");
    let config = td.path().join("config.yaml");
    std::fs::write(&config, "").expect("write config");
    let out = common::dockhand(&config)
        .arg("doctor")
        .output()
        .expect("failed to run dockhand doctor");
    assert!(
        out.status.success(),
        "dockhand doctor exited non-zero: {:?}\nstdout:\n{}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("launcher repository:"), "stderr:\n{}", stderr);
}

#[test]
fn test_cli_doctor_survives_broken_config() {
    let td = tempfile::tempdir().expect("tmpdir");
    let config = td.path().join("config.yaml");
    std::fs::write(&config, "vlan: [not, a, mapping\n").expect("write config");
    let out = common::dockhand(&config)
        .args(["doctor", "--quiet"])
        .output()
        .expect("failed to run dockhand doctor");
    assert!(
        out.status.success(),
        "doctor should tolerate a broken config: {:?}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stderr)
    );
}
