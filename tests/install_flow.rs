use dockhand::config::DockerSettings;
use dockhand::install::{AGENT_CONTAINER, STEP_GROUP, STEP_OS, STEP_VOLUME};
use dockhand::testing::FakeHost;
use dockhand::{
    collect_install_plan, DockerInstaller, DockhandError, InstallAnswers, InstallHost,
    InstallOptions, PortainerMode, ScriptedPrompter, StepOutcome,
};

fn host(fake: &FakeHost) -> InstallHost<'_> {
    InstallHost {
        packages: fake,
        services: fake,
        docker: fake,
        accounts: fake,
    }
}

fn opts(dir: &std::path::Path, os_release: &str) -> InstallOptions {
    let path = dir.join("os-release");
    std::fs::write(&path, os_release).expect("write os-release");
    InstallOptions {
        settings: DockerSettings::default(),
        os_release: path,
        dry_run: false,
    }
}

#[test]
fn test_prompted_agent_install() {
    let td = tempfile::tempdir().expect("tmpdir");
    let fake = FakeHost::new();
    let mut p = ScriptedPrompter::new(["", "n", "swarm", "agent"]);
    let plan = collect_install_plan(&mut p, &InstallAnswers::default(), Some("alice"))
        .expect("plan");
    assert!(plan.remove_conflicting);
    assert_eq!(plan.add_user_to_group, None);
    assert_eq!(plan.portainer, PortainerMode::Agent);
    assert_eq!(p.messages.len(), 1, "{:?}", p.messages);

    let report = DockerInstaller::new(
        host(&fake),
        opts(td.path(), "NAME=\"Fedora Linux\"\nID=fedora\nVERSION_ID=40\n"),
    )
    .run(&plan, &mut p)
    .expect("install");

    assert!(fake.installed("docker-ce"));
    assert!(fake.unit_enabled("docker"));
    assert!(!fake.in_group("alice", "docker"));
    assert_eq!(report.outcome_of(STEP_GROUP), None);
    assert_eq!(report.outcome_of(STEP_VOLUME), None);
    let agent = fake.container(AGENT_CONTAINER).expect("agent container");
    assert_eq!(agent.ports, vec!["9001:9001".to_string()]);
    assert!(!fake.has_volume("portainer_data"));
}

#[test]
fn test_non_fedora_host_can_be_declined() {
    let td = tempfile::tempdir().expect("tmpdir");
    let fake = FakeHost::new();
    let answers = InstallAnswers {
        remove_conflicting: Some(false),
        add_user: Some(false),
        portainer: Some(PortainerMode::None),
    };
    let mut p = ScriptedPrompter::new(Vec::<String>::new());
    let plan = collect_install_plan(&mut p, &answers, Some("alice")).expect("plan");
    assert!(p.questions.is_empty());

    let mut decline = ScriptedPrompter::new(["n"]);
    let err = DockerInstaller::new(host(&fake), opts(td.path(), "ID=ubuntu\nVERSION_ID=24.04\n"))
        .run(&plan, &mut decline)
        .unwrap_err();
    assert!(matches!(err, DockhandError::Aborted), "{err}");
    assert!(fake.log().is_empty(), "{:?}", fake.log());

    let mut accept = ScriptedPrompter::new(["y"]);
    let report = DockerInstaller::new(host(&fake), opts(td.path(), "ID=ubuntu\nVERSION_ID=24.04\n"))
        .run(&plan, &mut accept)
        .expect("install");
    assert!(matches!(report.outcome_of(STEP_OS), Some(StepOutcome::Warning(_))));
    assert!(fake.installed("docker-ce"));
}

#[test]
fn test_failed_service_step_can_be_continued() {
    let td = tempfile::tempdir().expect("tmpdir");
    let fake = FakeHost::new();
    fake.fail_on("systemctl enable");
    let answers = InstallAnswers {
        remove_conflicting: Some(true),
        add_user: Some(true),
        portainer: Some(PortainerMode::None),
    };
    let plan = collect_install_plan(
        &mut ScriptedPrompter::new(Vec::<String>::new()),
        &answers,
        Some("alice"),
    )
    .expect("plan");

    let mut p = ScriptedPrompter::new(["y"]);
    let report = DockerInstaller::new(host(&fake), opts(td.path(), "ID=fedora\n"))
        .run(&plan, &mut p)
        .expect("install continues");
    assert_eq!(report.warnings().len(), 2, "{:?}", report);
    assert!(fake.in_group("alice", "docker"));
}
