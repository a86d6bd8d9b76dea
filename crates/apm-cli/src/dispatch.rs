struct Workspace {
    settings: Settings,
    catalog: Catalog,
    record: InstalledRecord,
    installed_files: BTreeSet<String>,
}

impl Workspace {
    fn open(config_path: Option<&Path>, overrides: PathOverrides) -> Result<Self> {
        let config = load_config(config_path)?;
        let settings = Settings::resolve(config, overrides);

        let raw = fs::read_to_string(&settings.catalog)
            .with_context(|| format!("failed to read catalog: {}", settings.catalog.display()))?;
        let mut catalog = Catalog::from_json_str(&raw)
            .with_context(|| format!("invalid catalog: {}", settings.catalog.display()))?;
        let mut record = read_installed_record(&settings.record)?;

        if let Some(path) = &settings.id_conversions {
            let conversions = read_id_conversions(path)?;
            let renamed = catalog.apply_id_conversions(&conversions)
                + record.apply_id_conversions(&conversions);
            info!(renamed, "applied legacy id conversions");
        }

        let installed_files = scan_installed_files(&settings.layout, &settings.scan)?;
        Ok(Self {
            settings,
            catalog,
            record,
            installed_files,
        })
    }

    fn evaluate(&self) -> Evaluation {
        let layout = &self.settings.layout;
        let evaluation = evaluate_packages(
            &self.catalog.packages,
            &self.record,
            &self.installed_files,
            |filename| layout.exists(filename),
        );
        info!(
            packages = evaluation.packages.len(),
            manual_files = evaluation.manually_installed_files.len(),
            "evaluation pass finished"
        );
        evaluation
    }

    /// Versions recognized by file hashes for packages installed by hand.
    /// Probe failures are logged and skipped.
    fn probe_manual_versions(&self, evaluation: &Evaluation) -> BTreeMap<String, String> {
        let mut probed = BTreeMap::new();
        for package in &evaluation.packages {
            if package.installation_status != InstallationStatus::ManuallyInstalled {
                continue;
            }
            match detect_installed_release(&self.settings.layout, &package.descriptor) {
                Ok(Some(version)) => {
                    probed.insert(package.id().to_string(), version);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(id = package.id(), error = %format!("{err:#}"), "release probe failed");
                }
            }
        }
        probed
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let style = current_output_style(cli.plain);
    let overrides = PathOverrides {
        install_root: cli.root,
        catalog: cli.catalog,
        record: cli.record,
    };
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Status { all } => {
            let workspace = Workspace::open(config_path, overrides)?;
            let evaluation = workspace.evaluate();
            let probed = workspace.probe_manual_versions(&evaluation);
            let required = CoreVersionBinding::required_versions(&workspace.catalog.packages);

            print_lines(&format_core_lines(&workspace.record.core, &required));
            println!();
            print_lines(&format_status_lines(style, &evaluation, &probed, all));
        }
        Commands::Check { id } => {
            let workspace = Workspace::open(config_path, overrides)?;
            let evaluation = workspace.evaluate();
            let package = evaluation
                .get(&id)
                .ok_or_else(|| anyhow!("no package found: {id}"))?;

            let resolver = DependencyResolver::new(
                evaluation
                    .packages
                    .iter()
                    .map(|package| (&package.descriptor, &package.installation_status)),
                &workspace.record.core,
            );
            let report = CheckReport {
                package,
                installable: resolver.is_installable(&id),
                missing: resolver.missing_dependencies(&id),
                blocking: resolver.blocking_dependents(&id),
            };
            print_lines(&format_check_lines(style, &report));
        }
        Commands::Files => {
            let workspace = Workspace::open(config_path, overrides)?;
            let files = manually_installed_files(
                &workspace.installed_files,
                &workspace.catalog.packages,
                &workspace.record,
            );
            print_lines(&format_files_lines(&files));
        }
        Commands::Compare { a, b, explain } => {
            print_lines(&format_compare_lines(&a, &b, explain));
        }
        Commands::Completions { shell } => {
            let mut stdout = io::stdout().lock();
            write_completions_script(shell, &mut stdout)?;
        }
    }

    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
