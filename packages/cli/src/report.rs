use ariadne::{Color, Label, Report, ReportKind, Source};
use colored::Colorize;
use stencil_generator::{Diagnostic, DiagnosticLevel};

/// Render a diagnostic with its source line when the source is available
pub fn render_diagnostic(diagnostic: &Diagnostic, source: Option<&str>) -> String {
    match source {
        Some(source) => render_with_source(diagnostic, source),
        None => render_plain(diagnostic),
    }
}

fn render_with_source(diagnostic: &Diagnostic, source: &str) -> String {
    let path = diagnostic.location.path.as_str();
    let start = diagnostic.location.span.start.min(source.len());
    let end = diagnostic.location.span.end.clamp(start, source.len());

    let (kind, color) = match diagnostic.level {
        DiagnosticLevel::Error => (ReportKind::Error, Color::Red),
        DiagnosticLevel::Warning => (ReportKind::Warning, Color::Yellow),
        DiagnosticLevel::Info => (ReportKind::Advice, Color::Blue),
    };

    let mut report = Report::build(kind, path, start)
        .with_code(&diagnostic.id)
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((path, start..end))
                .with_color(color)
                .with_message(format!("on {}", diagnostic.target)),
        );
    if let Some(suggestion) = &diagnostic.suggestion {
        report = report.with_note(suggestion);
    }

    let mut output = Vec::new();
    if report
        .finish()
        .write((path, Source::from(source)), &mut output)
        .is_err()
    {
        return render_plain(diagnostic);
    }

    String::from_utf8(output).unwrap_or_else(|_| render_plain(diagnostic))
}

/// One-line rendering, `path:line:col: level ID: message`
pub fn render_plain(diagnostic: &Diagnostic) -> String {
    let level = match diagnostic.level {
        DiagnosticLevel::Error => "error".red().bold(),
        DiagnosticLevel::Warning => "warning".yellow().bold(),
        DiagnosticLevel::Info => "info".blue().bold(),
    };

    let mut line = format!(
        "{}: {} [{}] {}",
        diagnostic.location, level, diagnostic.id, diagnostic.message
    );
    if let Some(suggestion) = &diagnostic.suggestion {
        line.push_str(&format!("\n    {} {}", "help:".dimmed(), suggestion.dimmed()));
    }
    line
}
