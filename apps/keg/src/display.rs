//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use keg_ops::{FetchReport, LintReport, OperationResult, PlatformReport};
use keg_state::{HistoryEntry, HistoryOperation};
use keg_types::{ColorChoice, FormulaInfo, InstallReport, InstalledFormula, VerifyEntry};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::InstalledList(installed) => self.render_installed_list(installed),
            OperationResult::FormulaInfo(info) => self.render_formula_info(info),
            OperationResult::InstallReport(report) => self.render_install_report(report),
            OperationResult::FetchReport(report) => self.render_fetch_report(report),
            OperationResult::VerifyReport(entries) => self.render_verify_report(entries),
            OperationResult::PlatformReport(report) => self.render_platform_report(report),
            OperationResult::LintReport(report) => self.render_lint_report(report),
            OperationResult::History(entries) => self.render_history(entries),
        }
    }

    fn new_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.supports_color() {
            table.force_no_tty();
        }
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
        table
    }

    /// Render installed formulas
    fn render_installed_list(&self, installed: &[InstalledFormula]) -> io::Result<()> {
        if installed.is_empty() {
            return self.term.write_line("No formulas installed.");
        }

        let mut table = self.new_table(&["Formula", "Version", "Platform", "Binary", "Installed"]);
        for formula in installed {
            table.add_row(vec![
                Cell::new(&formula.name),
                Cell::new(formula.version.to_string()),
                Cell::new(formula.platform.as_str()),
                Cell::new(formula.binary_path.display()),
                Cell::new(formula.installed_at.format("%Y-%m-%d %H:%M")),
            ]);
        }

        self.term.write_line(&table.to_string())
    }

    /// Render formula information
    fn render_formula_info(&self, info: &FormulaInfo) -> io::Result<()> {
        let mut lines = vec![self.style_name(&info.name), String::new()];

        if let Some(desc) = &info.desc {
            lines.push(format!("Description: {desc}"));
        }
        lines.push(format!("Latest:      {}", info.latest_version));
        if info.available_versions.len() > 1 {
            let versions: Vec<String> = info
                .available_versions
                .iter()
                .map(ToString::to_string)
                .collect();
            lines.push(format!("Versions:    {}", versions.join(", ")));
        }
        let platforms: Vec<&str> = info.platforms.iter().map(|p| p.as_str()).collect();
        lines.push(format!("Platforms:   {}", platforms.join(", ")));
        if let Some(license) = &info.license {
            lines.push(format!("License:     {license}"));
        }
        if let Some(homepage) = &info.homepage {
            lines.push(format!("Homepage:    {homepage}"));
        }

        lines.push(String::new());
        match &info.installed {
            Some(installed) => {
                let status = if installed.version == info.latest_version {
                    self.paint(Style::new().green(), "up to date")
                } else {
                    self.paint(Style::new().yellow(), "outdated")
                };
                lines.push(format!("Installed:   {} ({status})", installed.version));
                lines.push(format!("Binary:      {}", installed.binary_path.display()));
                lines.push(format!("Size:        {}", format_size(installed.size)));
            }
            None => lines.push("Installed:   no".to_string()),
        }

        self.write_lines(&lines)
    }

    /// Render installation report
    fn render_install_report(&self, report: &InstallReport) -> io::Result<()> {
        if report.is_empty() {
            return self
                .term
                .write_line("No changes made. Use --force to reinstall.");
        }

        let mut lines = Vec::new();
        for change in &report.installed {
            let version = version_or_unknown(change.to_version.as_ref());
            lines.push(format!("{} {} {version}", self.ok_mark(), change.name));
            if let Some(path) = &change.path {
                lines.push(format!("    {}", path.display()));
            }
        }
        for change in &report.updated {
            let from = version_or_unknown(change.from_version.as_ref());
            let to = version_or_unknown(change.to_version.as_ref());
            lines.push(format!("{} {} {from} -> {to}", self.ok_mark(), change.name));
            if let Some(path) = &change.path {
                lines.push(format!("    {}", path.display()));
            }
        }
        for change in &report.removed {
            let version = version_or_unknown(change.from_version.as_ref());
            lines.push(format!("{} removed {} {version}", self.ok_mark(), change.name));
        }
        lines.push(format!("Completed in {}ms", report.duration_ms));

        self.write_lines(&lines)
    }

    fn render_fetch_report(&self, report: &FetchReport) -> io::Result<()> {
        let origin = if report.cached { "cached" } else { "downloaded" };
        self.write_lines(&[
            format!(
                "{} {} {} ({}, {origin})",
                self.ok_mark(),
                report.name,
                report.version,
                report.platform
            ),
            format!("Path:   {}", report.path.display()),
            format!("SHA256: {}", report.sha256),
            format!("Size:   {}", format_size(report.size)),
        ])
    }

    fn render_verify_report(&self, entries: &[VerifyEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return self.term.write_line("No formulas installed.");
        }

        let mut table = self.new_table(&["Formula", "Version", "Binary", "Status"]);
        for entry in entries {
            let status = match (&entry.actual, entry.ok) {
                (_, true) => Cell::new("ok").fg(Color::Green),
                (None, false) => Cell::new("missing").fg(Color::Red),
                (Some(_), false) => Cell::new("modified").fg(Color::Red),
            };
            table.add_row(vec![
                Cell::new(&entry.name),
                Cell::new(entry.version.to_string()),
                Cell::new(entry.binary_path.display()),
                status,
            ]);
        }

        self.term.write_line(&table.to_string())
    }

    fn render_platform_report(&self, report: &PlatformReport) -> io::Result<()> {
        let supported: Vec<String> = report
            .supported
            .iter()
            .map(|(os, tag)| format!("{os} ({tag})"))
            .collect();
        self.write_lines(&[
            format!("Host:      {}", report.os),
            format!("Platform:  {}", self.style_name(report.tag.as_str())),
            format!("Supported: {}", supported.join(", ")),
            format!("Bin dir:   {}", report.bin_dir.display()),
        ])
    }

    fn render_lint_report(&self, report: &LintReport) -> io::Result<()> {
        let mut lines = vec![
            format!(
                "{} {} {} is valid",
                self.ok_mark(),
                report.name,
                report.version
            ),
            format!("Binary: {}", report.binary),
        ];
        for artifact in &report.artifacts {
            lines.push(format!(
                "  {:<6} {} <- {}",
                artifact.platform, artifact.artifact_name, artifact.url
            ));
        }
        self.write_lines(&lines)
    }

    fn render_history(&self, entries: &[HistoryEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return self.term.write_line("No history recorded.");
        }

        let mut table = self.new_table(&["When", "Operation", "Formula", "Version", "Previous"]);
        for entry in entries {
            let operation = match entry.operation {
                HistoryOperation::Install => Cell::new("install").fg(Color::Green),
                HistoryOperation::Uninstall => Cell::new("uninstall").fg(Color::Yellow),
            };
            table.add_row(vec![
                Cell::new(entry.recorded_at.format("%Y-%m-%d %H:%M:%S")),
                operation,
                Cell::new(&entry.name),
                Cell::new(entry.version.to_string()),
                Cell::new(version_or_dash(entry.previous_version.as_ref())),
            ]);
        }

        self.term.write_line(&table.to_string())
    }

    fn write_lines(&self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            self.term.write_line(line)?;
        }
        Ok(())
    }

    fn ok_mark(&self) -> String {
        self.paint(Style::new().green().bold(), "[OK]")
    }

    fn style_name(&self, name: &str) -> String {
        self.paint(Style::new().bold(), name)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.supports_color() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

fn version_or_unknown(version: Option<&keg_types::Version>) -> String {
    version.map_or_else(|| "unknown".to_string(), ToString::to_string)
}

fn version_or_dash(version: Option<&keg_types::Version>) -> String {
    version.map_or_else(|| "-".to_string(), ToString::to_string)
}

/// Format a byte count for display
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{size:.0} {}", UNITS[unit_index])
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_paint_respects_never() {
        let renderer = OutputRenderer::new(false, ColorChoice::Never);
        assert_eq!(renderer.paint(Style::new().red(), "text"), "text");
    }
}
