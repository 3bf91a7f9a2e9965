//! Worker detail pane (right panel).

use obra_core::{
  format::{Locale, format_datetime},
  worker::{Payment, WorkerRecord},
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

/// Render the record under the cursor into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(record) = app.cursor_record() else {
    let block = Block::default()
      .title(" Detalhes ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let hint = if app.view.summary.total == 0 {
      "Nenhum obreiro cadastrado."
    } else {
      "Nenhum obreiro corresponde aos filtros."
    };
    f.render_widget(
      Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", record.full_name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(lines(record))
      .wrap(Wrap { trim: false })
      .block(block),
    area,
  );
}

fn row(label: &str, value: impl Into<String>) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<16}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::raw(value.into()),
  ])
}

fn lines(r: &WorkerRecord) -> Vec<Line<'static>> {
  let mut lines = vec![
    row("tipo", r.worker_type.label()),
    row("setor", r.sector.clone()),
    row("campo", r.field.clone()),
  ];
  if let Some(mf) = &r.missionary_field {
    lines.push(row("campo missão", mf.clone()));
  }

  lines.push(Line::from(""));
  lines.push(row("pagamento", r.payment.kind().label()));
  if let Payment::Bank {
    agency,
    savings_account,
    checking_account,
  } = &r.payment
  {
    lines.push(row("agência", agency.clone()));
    if let Some(acc) = savings_account {
      lines.push(row("poupança", acc.clone()));
    }
    if let Some(acc) = checking_account {
      lines.push(row("conta corrente", acc.clone()));
    }
  }

  if let Some(notes) = &r.notes {
    lines.push(Line::from(""));
    lines.push(row("observações", notes.clone()));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    format!(
      "cadastrado por {} em {}  (id {})",
      r.created_by,
      format_datetime(r.created_at, Locale::PtBr),
      r.id
    ),
    Style::default().fg(Color::DarkGray),
  )));
  lines
}
