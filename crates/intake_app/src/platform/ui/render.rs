use intake_core::{AppViewModel, BatchRowView, DocumentRecord, Mode, RecordView};

/// Renders the view model as plain text lines for the terminal.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(notice) = &view.notice {
        lines.push(notice.clone());
    }
    if let Some(stats) = &view.last_intake {
        let fresh = matches!(view.mode, Mode::Analyzing) || stats.accepted == 0;
        if stats.skipped > 0 && fresh {
            lines.push(format!(
                "Accepted {} file(s), skipped {} unsupported.",
                stats.accepted, stats.skipped
            ));
        }
    }

    match view.mode {
        Mode::Idle => {
            lines.push("Ready. Use 'add <paths..>' to analyze more documents.".to_string());
        }
        Mode::Analyzing => lines.push(analyzing_line(view)),
        Mode::ReviewSingle => {
            if let Some(card) = &view.single {
                render_card(card, &mut lines);
            }
            lines.push(status_or_help(view, "confirm | discard"));
        }
        Mode::ReviewBatch => {
            render_batch(view, &mut lines);
            lines.push(status_or_help(view, "confirm | remove <id> | add <paths..> | more"));
        }
        Mode::Success => lines.push("Sent successfully.".to_string()),
        Mode::Error => {
            let message = view.error.as_deref().unwrap_or("Something went wrong.");
            lines.push(format!("Error: {message}"));
            if view.can_resume {
                lines.push("commands: retry | back".to_string());
            } else {
                lines.push("commands: retry".to_string());
            }
        }
    }

    lines
}

fn analyzing_line(view: &AppViewModel) -> String {
    match (&view.progress, &view.single) {
        (Some(progress), _) => format!(
            "Analyzing document {} of {}...",
            progress.current.max(1),
            progress.total
        ),
        (None, Some(card)) => format!("Analyzing {}...", card.file_name),
        (None, None) => "Analyzing...".to_string(),
    }
}

fn status_or_help(view: &AppViewModel, commands: &str) -> String {
    if view.submitting {
        "Sending...".to_string()
    } else {
        format!("commands: {commands}")
    }
}

fn render_card(card: &RecordView, lines: &mut Vec<String>) {
    lines.push(format!("{} ({})", card.file_name, card.preview_uri));
    let Some(record) = &card.record else {
        return;
    };
    lines.push(format!("  Type:     {}", record.document_type));
    lines.push(format!(
        "  Number:   {}",
        record.document_number.as_deref().unwrap_or("-")
    ));
    lines.push(format!("  Date:     {}", or_dash(&record.date)));
    lines.push(format!("  Supplier: {}", or_dash(&record.supplier)));
    lines.push(format!("  Concept:  {}", or_dash(&record.concept)));
    lines.push(format!("  Base:     {}", record.tax_base));
    lines.push(format!("  Taxes:    {}", record.taxes));
    lines.push(format!("  Total:    {}", record.total));
    if !card.totals_consistent {
        lines.push(totals_warning(record));
    }
}

fn render_batch(view: &AppViewModel, lines: &mut Vec<String>) {
    lines.push(format!("{} document(s) to review:", view.batch.len()));
    for row in &view.batch {
        lines.push(batch_row(row));
    }
    lines.push(format!(
        "Total: {:.2} ({} pending)",
        view.batch_total, view.unsubmitted
    ));
}

fn batch_row(row: &BatchRowView) -> String {
    let record = &row.record;
    let status = if row.submitted { " [sent]" } else { "" };
    let check = if row.totals_consistent { "" } else { " (!)" };
    format!(
        "  #{:<3} {:<11} {:<10} {:<24} {:>12}{}{}  {}",
        row.id,
        record.document_type.as_str(),
        or_dash(&record.date),
        or_dash(&record.supplier),
        record.total.to_string(),
        check,
        status,
        row.file_name
    )
}

fn totals_warning(record: &DocumentRecord) -> String {
    format!(
        "  (!) base {} + taxes {} does not match total {}",
        record.tax_base, record.taxes, record.total
    )
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}
