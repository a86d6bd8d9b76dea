#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OutputStyle {
    Plain,
    Rich,
}

fn current_output_style(plain: bool) -> OutputStyle {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    resolve_output_style(plain || no_color, std::io::stdout().is_terminal())
}

fn resolve_output_style(force_plain: bool, stdout_is_tty: bool) -> OutputStyle {
    if !force_plain && stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

fn header_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn installation_status_style(status: &InstallationStatus) -> Style {
    let color = match status {
        InstallationStatus::Installed(_) => AnsiColor::Green,
        InstallationStatus::ManuallyInstalled => AnsiColor::Cyan,
        InstallationStatus::OtherInstalled => AnsiColor::Yellow,
        InstallationStatus::InstalledButBroken => AnsiColor::Red,
        InstallationStatus::NotInstalled => AnsiColor::BrightBlack,
    };
    Style::new().fg_color(Some(color.into()))
}

fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let (badge, badge_style) = match status {
                "ok" => ("[OK]", Style::new().fg_color(Some(AnsiColor::Green.into()))),
                "warn" => ("[WARN]", Style::new().fg_color(Some(AnsiColor::Yellow.into()))),
                "error" => ("[ERR]", Style::new().fg_color(Some(AnsiColor::Red.into()))),
                _ => ("[..]", Style::new()),
            };
            format!("{} {message}", colorize(badge_style.effects(Effects::BOLD), badge))
        }
    }
}

fn render_header(style: OutputStyle, header: &str) -> String {
    match style {
        OutputStyle::Plain => header.to_string(),
        OutputStyle::Rich => colorize(header_style(), header),
    }
}

fn render_installation_status(style: OutputStyle, status: &InstallationStatus) -> String {
    match style {
        OutputStyle::Plain => status.as_str().to_string(),
        OutputStyle::Rich => colorize(installation_status_style(status), status.as_str()),
    }
}

fn format_core_lines(
    core: &CoreVersions,
    required: &BTreeSet<(CoreProgram, String)>,
) -> Vec<String> {
    CoreProgram::ALL
        .iter()
        .map(|program| {
            let installed = core.get(*program).unwrap_or("-");
            let referenced = required
                .iter()
                .filter(|(required_program, _)| required_program == program)
                .map(|(_, version)| version.as_str())
                .collect::<Vec<_>>();
            if referenced.is_empty() {
                format!("{program}\t{installed}")
            } else {
                format!(
                    "{program}\t{installed}\treferenced: {}",
                    referenced.join(", ")
                )
            }
        })
        .collect()
}

/// One row per package; packages that are not installed are listed only with
/// `all`. `probed` holds versions recognized from file hashes for packages
/// installed by hand.
fn format_status_lines(
    style: OutputStyle,
    evaluation: &Evaluation,
    probed: &BTreeMap<String, String>,
    all: bool,
) -> Vec<String> {
    let rows = evaluation
        .packages
        .iter()
        .filter(|package| all || package.installation_status != InstallationStatus::NotInstalled)
        .collect::<Vec<_>>();
    if rows.is_empty() {
        return vec!["No installed packages. Pass --all to list the whole catalog.".to_string()];
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_header(style, "id\tstatus\tversion\tlatest\tnotes"));
    for package in rows {
        let version = package
            .version()
            .map(str::to_string)
            .or_else(|| probed.get(package.id()).map(|version| format!("~{version}")))
            .unwrap_or_else(|| "-".to_string());
        let latest = if package.descriptor.latest_version.is_empty() {
            "-"
        } else {
            package.descriptor.latest_version.as_str()
        };
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}",
            package.id(),
            render_installation_status(style, &package.installation_status),
            version,
            latest,
            package_notes(package).join("; ")
        ));
    }
    lines
}

fn package_notes(package: &ResolvedPackage) -> Vec<String> {
    let mut notes = Vec::new();
    if package.update_available() {
        notes.push("update available".to_string());
    }
    if package.do_not_install {
        notes.push("not installable".to_string());
    }
    if !package.detached.is_empty() {
        let missing = package
            .detached
            .iter()
            .map(|dependency| dependency.id())
            .collect::<Vec<_>>();
        notes.push(format!("missing: {}", missing.join(", ")));
    }
    notes
}

struct CheckReport<'a> {
    package: &'a ResolvedPackage,
    installable: bool,
    missing: Vec<QualifiedId>,
    blocking: Vec<String>,
}

fn format_check_lines(style: OutputStyle, report: &CheckReport<'_>) -> Vec<String> {
    let package = report.package;
    let mut lines = vec![
        format!("Package: {}", package.id()),
        format!(
            "  Status: {}",
            render_installation_status(style, &package.installation_status)
        ),
    ];
    if let Some(version) = package.version() {
        lines.push(format!("  Version: {version}"));
    }
    if !package.descriptor.latest_version.is_empty() {
        lines.push(format!("  Latest: {}", package.descriptor.latest_version));
    }
    if !package.descriptor.dependencies.is_empty() {
        let groups = package
            .descriptor
            .dependencies
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        lines.push(format!("  Depends: {}", groups.join(", ")));
    }
    if !package.descriptor.conflicts.is_empty() {
        let groups = package
            .descriptor
            .conflicts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        lines.push(format!("  Conflicts: {}", groups.join(", ")));
    }

    lines.push(if report.installable {
        render_status_line(style, "ok", "installable")
    } else {
        render_status_line(style, "error", "not installable")
    });
    if !report.missing.is_empty() {
        let missing = report
            .missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        lines.push(render_status_line(
            style,
            "warn",
            &format!("missing dependencies: {}", missing.join(", ")),
        ));
    }
    if !report.blocking.is_empty() {
        lines.push(render_status_line(
            style,
            "warn",
            &format!("required by: {}", report.blocking.join(", ")),
        ));
    }
    lines
}

fn format_files_lines(files: &BTreeSet<String>) -> Vec<String> {
    if files.is_empty() {
        return vec!["No files outside recorded packages.".to_string()];
    }
    files.iter().cloned().collect()
}

fn format_compare_lines(a: &str, b: &str, explain: bool) -> Vec<String> {
    let symbol = match try_compare_versions(a, b) {
        Some(Ordering::Less) => "<",
        Some(Ordering::Equal) => "=",
        Some(Ordering::Greater) => ">",
        None => "?",
    };
    let mut lines = vec![format!("{a} {symbol} {b}")];
    if explain {
        lines.push(format!("  {a} -> {}", normalize_version(a)));
        lines.push(format!("  {b} -> {}", normalize_version(b)));
        if symbol == "?" {
            lines.push("  unordered; treated as equal".to_string());
        }
    }
    lines
}
