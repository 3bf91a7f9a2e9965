//! Worker list pane (left panel).

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::App;

/// Render the filtered worker list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let shown = app.view.records.len();
  let total = app.view.summary.total;
  let title = if shown == total {
    format!(" Obreiros ({total}) ")
  } else {
    format!(" Obreiros ({shown}/{total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = app
    .view
    .records
    .iter()
    .map(|r| {
      ListItem::new(Line::from(vec![
        Span::raw(r.full_name.clone()),
        Span::styled(
          format!("  {} · {}", r.worker_type.label(), r.field),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((shown > 0).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}
