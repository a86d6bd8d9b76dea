#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

    static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

    const CATALOG_JSON: &str = r#"{
  "packages": [
    {
      "id": "author/x",
      "name": "X",
      "latestVersion": "1.2",
      "files": [{"filename": "plugins/x.auf"}],
      "dependencies": ["author/y", "aviutl1.10"]
    },
    {
      "id": "author/y",
      "name": "Y",
      "latestVersion": "2.0",
      "files": [{"filename": "script/y.anm"}],
      "releases": {
        "2.0": {"integrity": {"files": [{"target": "script/y.anm", "hash": "sha256-ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"}]}}
      }
    },
    {
      "id": "author/z",
      "latestVersion": "0.1",
      "files": [{"filename": "z.auf"}],
      "conflicts": ["author/x"]
    }
  ]
}"#;

    fn test_root() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let sequence = TEST_ROOT_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "apm-cli-tests-{}-{}-{}",
            std::process::id(),
            nanos,
            sequence
        ));
        std::fs::create_dir_all(&root).expect("must create test root");
        root
    }

    fn write_file(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("must create parent dir");
        }
        std::fs::write(path, contents).expect("must write file");
    }

    fn seeded_workspace(root: &Path) -> Workspace {
        write_file(root, "packages.json", CATALOG_JSON);
        write_file(
            root,
            ".apm/installed.json",
            r#"{"core": {"aviutl": "1.10"}, "packages": {"author/x": "1.0"}}"#,
        );
        write_file(root, "plugins/x.auf", "x");
        write_file(root, "script/y.anm", "abc");
        write_file(root, "plugins/stray.auf", "");

        Workspace::open(
            None,
            PathOverrides {
                install_root: Some(root.to_path_buf()),
                catalog: Some(root.join("packages.json")),
                record: None,
            },
        )
        .expect("workspace must open")
    }

    #[test]
    fn cli_parses_status_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["apm", "status", "--all", "--root", "/opt/aviutl", "--plain"])
            .expect("status must parse");
        assert!(cli.plain);
        assert_eq!(cli.root.as_deref(), Some(Path::new("/opt/aviutl")));
        assert!(matches!(cli.command, Commands::Status { all: true }));
    }

    #[test]
    fn cli_parses_compare_and_completions() {
        let cli = Cli::try_parse_from(["apm", "compare", "1.0", "1.0a", "--explain"])
            .expect("compare must parse");
        match cli.command {
            Commands::Compare { a, b, explain } => {
                assert_eq!(a, "1.0");
                assert_eq!(b, "1.0a");
                assert!(explain);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["apm", "completions", "powershell"])
            .expect("completions must parse");
        assert!(matches!(
            cli.command,
            Commands::Completions {
                shell: CliCompletionShell::Powershell
            }
        ));
    }

    #[test]
    fn cli_rejects_check_without_id() {
        let err = Cli::try_parse_from(["apm", "check"]).expect_err("id is required");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn cli_requires_a_known_completion_shell() {
        let err = Cli::try_parse_from(["apm", "completions"]).expect_err("shell is required");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["apm", "completions", "tcsh"])
            .expect_err("unsupported shell must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn resolve_output_style_prefers_plain_when_forced_or_piped() {
        assert_eq!(resolve_output_style(false, true), OutputStyle::Rich);
        assert_eq!(resolve_output_style(true, true), OutputStyle::Plain);
        assert_eq!(resolve_output_style(false, false), OutputStyle::Plain);
    }

    #[test]
    fn render_status_line_plain_is_unadorned() {
        assert_eq!(
            render_status_line(OutputStyle::Plain, "ok", "installable"),
            "installable"
        );
    }

    #[test]
    fn render_status_line_rich_includes_ascii_badge() {
        let line = render_status_line(OutputStyle::Rich, "warn", "missing dependencies: a/b");
        assert!(line.contains("[WARN]"));
        assert!(line.ends_with(" missing dependencies: a/b"));
    }

    #[test]
    fn config_parses_all_keys() {
        let config = CliConfig::from_toml_str(
            r#"
install_root = "C:/aviutl"
catalog = "packages.json"
record = "C:/aviutl/.apm/installed.json"
id_conversions = "convert.json"
tracked_extensions = ["auf", "lua"]
excluded_files = []
"#,
        )
        .expect("config must parse");
        assert_eq!(config.install_root, Some(PathBuf::from("C:/aviutl")));
        assert_eq!(config.id_conversions, Some(PathBuf::from("convert.json")));
        assert_eq!(
            config.tracked_extensions,
            Some(vec!["auf".to_string(), "lua".to_string()])
        );
        assert_eq!(config.excluded_files, Some(Vec::new()));
    }

    #[test]
    fn config_rejects_unknown_keys() {
        let err = CliConfig::from_toml_str("install_rot = \"x\"\n").expect_err("typo must fail");
        assert!(format!("{err:#}").contains("install_rot"));
    }

    #[test]
    fn settings_prefer_flags_and_default_under_root() {
        let config = CliConfig {
            install_root: Some(PathBuf::from("/from/config")),
            catalog: Some(PathBuf::from("/from/config/catalog.json")),
            tracked_extensions: Some(vec!["lua".to_string()]),
            ..CliConfig::default()
        };
        let overrides = PathOverrides {
            install_root: Some(PathBuf::from("/from/flag")),
            ..PathOverrides::default()
        };

        let settings = Settings::resolve(config, overrides);
        assert_eq!(settings.layout.root(), Path::new("/from/flag"));
        assert_eq!(settings.catalog, PathBuf::from("/from/config/catalog.json"));
        assert_eq!(settings.record, settings.layout.record_path());
        assert_eq!(settings.scan.tracked_extensions, vec!["lua".to_string()]);
        assert_eq!(
            settings.scan.excluded_files,
            ScanOptions::default().excluded_files
        );
    }

    #[test]
    fn load_config_requires_explicit_path_to_exist() {
        let root = test_root();
        let missing = root.join("nope.toml");
        let err = load_config(Some(&missing)).expect_err("explicit config must exist");
        assert!(err.to_string().contains("failed to read config"));

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn format_compare_lines_reports_order_and_unordered_pairs() {
        assert_eq!(format_compare_lines("1.0", "1.1", false), vec!["1.0 < 1.1"]);
        assert_eq!(format_compare_lines("1.10", "1.9", false), vec!["1.10 > 1.9"]);

        let lines = format_compare_lines("2020/01/01", "1.0", true);
        assert_eq!(lines[0], "2020/01/01 ? 1.0");
        assert_eq!(lines.last().map(String::as_str), Some("  unordered; treated as equal"));
    }

    #[test]
    fn format_core_lines_lists_referenced_versions() {
        let core = CoreVersions {
            aviutl: Some("1.10".to_string()),
            exedit: None,
        };
        let required = BTreeSet::from([
            (CoreProgram::Aviutl, "1.00".to_string()),
            (CoreProgram::Aviutl, "1.10".to_string()),
        ]);
        assert_eq!(
            format_core_lines(&core, &required),
            vec![
                "aviutl\t1.10\treferenced: 1.00, 1.10".to_string(),
                "exedit\t-".to_string()
            ]
        );
    }

    #[test]
    fn write_completions_script_emits_apm_commands() {
        let mut output = Vec::new();
        write_completions_script(CliCompletionShell::Bash, &mut output)
            .expect("must write completions");
        let script = String::from_utf8(output).expect("completion script is utf-8");
        assert!(script.contains("apm"));
        assert!(script.contains("compare"));
    }

    #[test]
    fn workspace_status_reports_installed_manual_and_conflicted_packages() {
        let root = test_root();
        let workspace = seeded_workspace(&root);
        let evaluation = workspace.evaluate();

        let x = evaluation.get("author/x").expect("x");
        assert_eq!(
            x.installation_status,
            InstallationStatus::Installed("1.0".to_string())
        );
        assert!(x.update_available());
        assert!(!x.do_not_install);

        let y = evaluation.get("author/y").expect("y");
        assert_eq!(y.installation_status, InstallationStatus::ManuallyInstalled);

        let z = evaluation.get("author/z").expect("z");
        assert!(z.do_not_install);

        let probed = workspace.probe_manual_versions(&evaluation);
        assert_eq!(probed.get("author/y").map(String::as_str), Some("2.0"));

        let lines = format_status_lines(OutputStyle::Plain, &evaluation, &probed, false);
        assert_eq!(
            lines,
            vec![
                "id\tstatus\tversion\tlatest\tnotes".to_string(),
                "author/x\tinstalled\t1.0\t1.2\tupdate available".to_string(),
                "author/y\tmanually installed\t~2.0\t2.0\t".to_string(),
            ]
        );

        let all = format_status_lines(OutputStyle::Plain, &evaluation, &probed, true);
        assert_eq!(all.len(), 4);
        assert_eq!(all[3], "author/z\tnot installed\t-\t0.1\tnot installable");

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn workspace_check_explains_dependents() {
        let root = test_root();
        let workspace = seeded_workspace(&root);
        let evaluation = workspace.evaluate();
        let resolver = DependencyResolver::new(
            evaluation
                .packages
                .iter()
                .map(|package| (&package.descriptor, &package.installation_status)),
            &workspace.record.core,
        );

        let report = CheckReport {
            package: evaluation.get("author/y").expect("y"),
            installable: resolver.is_installable("author/y"),
            missing: resolver.missing_dependencies("author/y"),
            blocking: resolver.blocking_dependents("author/y"),
        };
        let lines = format_check_lines(OutputStyle::Plain, &report);
        assert_eq!(lines[0], "Package: author/y");
        assert_eq!(lines[1], "  Status: manually installed");
        assert!(lines.contains(&"installable".to_string()));
        assert!(lines.contains(&"required by: author/x".to_string()));

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn workspace_lists_files_outside_recorded_packages() {
        let root = test_root();
        let workspace = seeded_workspace(&root);
        let files = manually_installed_files(
            &workspace.installed_files,
            &workspace.catalog.packages,
            &workspace.record,
        );
        assert_eq!(
            format_files_lines(&files),
            vec!["plugins/stray.auf".to_string(), "script/y.anm".to_string()]
        );

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn workspace_applies_legacy_id_conversions() {
        let root = test_root();
        write_file(
            &root,
            "packages.json",
            r#"{"packages": [{"id": "old/name", "files": [{"filename": "a.auf"}]}]}"#,
        );
        write_file(&root, "convert.json", r#"{"old/name": "new/name"}"#);
        write_file(
            &root,
            ".apm/installed.json",
            r#"{"packages": {"old/name": "1.0"}}"#,
        );
        write_file(&root, "a.auf", "");
        write_file(
            &root,
            "apm.toml",
            &format!(
                "install_root = {:?}\ncatalog = {:?}\nid_conversions = {:?}\n",
                root.display().to_string(),
                root.join("packages.json").display().to_string(),
                root.join("convert.json").display().to_string()
            ),
        );

        let config_path = root.join("apm.toml");
        let workspace = Workspace::open(Some(&config_path), PathOverrides::default())
            .expect("workspace must open");
        assert!(workspace.catalog.get("new/name").is_some());
        assert_eq!(workspace.record.version_of("new/name"), Some("1.0"));

        let evaluation = workspace.evaluate();
        assert_eq!(
            evaluation
                .get("new/name")
                .map(|package| package.installation_status.clone()),
            Some(InstallationStatus::Installed("1.0".to_string()))
        );

        let _ = std::fs::remove_dir_all(root);
    }
}
