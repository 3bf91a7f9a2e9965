//! TUI rendering: header, counters, filter bar, panes and status bar.

pub mod worker_detail;
pub mod worker_list;

use chrono::Local;
use obra_core::{
  view::WorkerFilter,
  worker::{PaymentKind, WorkerType},
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};
use strum::IntoEnumIterator as _;

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // counters
      Constraint::Length(1), // filter bar
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0]);
  draw_counters(f, rows[1], app);
  draw_filters(f, rows[2], app);
  draw_body(f, rows[3], app);
  draw_status(f, rows[4], app);

  if let Screen::ConfirmDelete { name, .. } = &app.screen {
    draw_confirm(f, name);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%d/%m/%Y").to_string();

  let left = Span::styled(
    " obra  obreiros",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let pad = (area.width as usize)
    .saturating_sub(left.width())
    .saturating_sub(right.width());
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad)), right]);

  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

fn draw_counters(f: &mut Frame, area: Rect, app: &App) {
  let summary = &app.view.summary;
  let label = Style::default().fg(Color::DarkGray);
  let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

  let mut spans = vec![
    Span::styled(" Total ", label),
    Span::styled(summary.total.to_string(), value),
    Span::styled("  Filtrados ", label),
    Span::styled(app.view.filtered.to_string(), value),
    Span::styled("  │", label),
  ];
  for t in WorkerType::iter() {
    let n = summary.by_type.get(&t).copied().unwrap_or_default();
    spans.push(Span::styled(format!("  {} ", t.label()), label));
    spans.push(Span::styled(n.to_string(), value));
  }
  spans.push(Span::styled("  │", label));
  for k in PaymentKind::iter() {
    let n = summary.by_payment.get(&k).copied().unwrap_or_default();
    spans.push(Span::styled(format!("  {} ", k.label()), label));
    spans.push(Span::styled(n.to_string(), value));
  }

  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_filters(f: &mut Frame, area: Rect, app: &App) {
  let WorkerFilter {
    search,
    worker_type,
    sector,
    payment_kind,
    year,
  } = &app.filter;
  const ALL: &str = "todos";

  let search = match (search, app.search_active) {
    (Some(s), true) => format!("{s}_"),
    (None, true) => "_".into(),
    (Some(s), false) => s.clone(),
    (None, false) => "—".into(),
  };
  let text = format!(
    " /busca: {search}  t tipo: {}  s setor: {}  p pagamento: {}  y ano: {}",
    worker_type.map_or(ALL, WorkerType::label),
    sector.as_deref().unwrap_or(ALL),
    payment_kind.map_or(ALL, PaymentKind::label),
    year.map_or_else(|| ALL.to_string(), |y| y.to_string()),
  );

  let style = if app.filter == WorkerFilter::default() && !app.search_active {
    Style::default().fg(Color::DarkGray)
  } else {
    Style::default().fg(Color::Yellow)
  };
  f.render_widget(Paragraph::new(text).style(style), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  worker_list::draw(f, cols[0], app);
  worker_detail::draw(f, cols[1], app);
}

// ─── Confirmation popup ───────────────────────────────────────────────────────

fn draw_confirm(f: &mut Frame, name: &str) {
  let area = centered(f.area(), 50, 5);
  let block = Block::default()
    .title(" Confirmar exclusão ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let text = vec![
    Line::from(format!("Excluir {name}?")),
    Line::from(""),
    Line::from(Span::styled(
      "[y] sim   [n] não",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Clear, area);
  f.render_widget(Paragraph::new(text).block(block), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    Screen::ConfirmDelete { .. } => ("CONFIRM", "y sim  n/Esc não"),
    Screen::List if app.search_active => ("SEARCH", "Digite para filtrar  Esc limpa  Enter fixa"),
    Screen::List => (
      "NORMAL",
      "↑↓/jk navegar  / busca  t s p y filtros  c limpa  d exclui  r recarrega  q sair",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
