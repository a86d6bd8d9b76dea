const DEFAULT_CONFIG_FILE: &str = "apm.toml";

/// `apm.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct CliConfig {
    install_root: Option<PathBuf>,
    catalog: Option<PathBuf>,
    record: Option<PathBuf>,
    id_conversions: Option<PathBuf>,
    tracked_extensions: Option<Vec<String>>,
    excluded_files: Option<Vec<String>>,
}

impl CliConfig {
    fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("failed to parse apm configuration")
    }
}

/// Paths supplied on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
struct PathOverrides {
    install_root: Option<PathBuf>,
    catalog: Option<PathBuf>,
    record: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    layout: InstallLayout,
    catalog: PathBuf,
    record: PathBuf,
    id_conversions: Option<PathBuf>,
    scan: ScanOptions,
}

impl Settings {
    fn resolve(config: CliConfig, overrides: PathOverrides) -> Self {
        let install_root = overrides
            .install_root
            .or(config.install_root)
            .unwrap_or_else(|| PathBuf::from("."));
        let layout = InstallLayout::new(install_root);
        let catalog = overrides
            .catalog
            .or(config.catalog)
            .unwrap_or_else(|| layout.state_dir().join("packages.json"));
        let record = overrides
            .record
            .or(config.record)
            .unwrap_or_else(|| layout.record_path());

        let mut scan = ScanOptions::default();
        if let Some(extensions) = config.tracked_extensions {
            scan.tracked_extensions = extensions;
        }
        if let Some(excluded) = config.excluded_files {
            scan.excluded_files = excluded;
        }

        Self {
            layout,
            catalog,
            record,
            id_conversions: config.id_conversions,
            scan,
        }
    }
}

/// Reads `path`, or `./apm.toml` when present. An explicit path must exist.
fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if !required && !path.exists() {
        return Ok(CliConfig::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    CliConfig::from_toml_str(&raw).with_context(|| format!("invalid config: {}", path.display()))
}

fn read_id_conversions(path: &Path) -> Result<BTreeMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read id conversions: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse id conversions: {}", path.display()))
}
