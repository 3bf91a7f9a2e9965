//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use obra_core::{
  access::DeleteOutcome,
  catalog::Catalog,
  view::{WorkerFilter, WorkerView, derive_view, years_present},
  worker::{PaymentKind, WorkerRecord, WorkerType},
};
use strum::IntoEnumIterator as _;

use crate::client::ApiClient;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Browsing the filtered list.
  List,
  /// Waiting for a y/n answer before deleting a worker.
  ConfirmDelete { id: String, name: String },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  /// Every worker known to the server, as last fetched.
  pub records: Vec<WorkerRecord>,

  /// Sectors offered by the `s` filter.
  pub catalog: Catalog,

  /// Active filter criteria.
  pub filter: WorkerFilter,

  /// `records` after `filter`, newest first, plus the header counters.
  pub view: WorkerView,

  /// Whether the user is typing into the search box.
  pub search_active: bool,

  /// Cursor position within `view.records`.
  pub list_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub client: Arc<ApiClient>,
}

/// Step to the next option, wrapping from the last option back to "all".
fn cycle<T: Clone + PartialEq>(current: Option<&T>, options: &[T]) -> Option<T> {
  match current {
    None => options.first().cloned(),
    Some(c) => options
      .iter()
      .position(|o| o == c)
      .and_then(|i| options.get(i + 1))
      .cloned(),
  }
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::List,
      records: Vec::new(),
      catalog: Catalog::default(),
      filter: WorkerFilter::default(),
      view: derive_view(&[], &WorkerFilter::default()),
      search_active: false,
      list_cursor: 0,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the catalog and all workers.
  pub async fn load(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Carregando…".into();
    let loaded = async {
      let catalog = self.client.catalog().await?;
      let records = self.client.list_workers().await?;
      anyhow::Ok((catalog, records))
    }
    .await;
    match loaded {
      Ok((catalog, records)) => {
        self.catalog = catalog;
        self.set_records(records);
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Erro: {e}");
        Err(e)
      }
    }
  }

  pub fn set_records(&mut self, records: Vec<WorkerRecord>) {
    self.records = records;
    self.refresh_view();
  }

  /// Re-derive the list and counters after the records or filter changed.
  pub fn refresh_view(&mut self) {
    self.view = derive_view(&self.records, &self.filter);
    if self.list_cursor >= self.view.records.len() {
      self.list_cursor = self.view.records.len().saturating_sub(1);
    }
  }

  /// The record under the list cursor, if any.
  pub fn cursor_record(&self) -> Option<&WorkerRecord> {
    self.view.records.get(self.list_cursor)
  }

  // ── Filters ───────────────────────────────────────────────────────────────

  fn set_filter(&mut self, update: impl FnOnce(&mut WorkerFilter)) {
    update(&mut self.filter);
    self.list_cursor = 0;
    self.refresh_view();
  }

  pub fn cycle_worker_type(&mut self) {
    let options: Vec<WorkerType> = WorkerType::iter().collect();
    self.set_filter(|f| f.worker_type = cycle(f.worker_type.as_ref(), &options));
  }

  pub fn cycle_payment_kind(&mut self) {
    let options: Vec<PaymentKind> = PaymentKind::iter().collect();
    self.set_filter(|f| f.payment_kind = cycle(f.payment_kind.as_ref(), &options));
  }

  pub fn cycle_sector(&mut self) {
    let options: Vec<String> = self.catalog.sectors().map(str::to_owned).collect();
    self.set_filter(|f| f.sector = cycle(f.sector.as_ref(), &options));
  }

  pub fn cycle_year(&mut self) {
    let options = years_present(&self.records);
    self.set_filter(|f| f.year = cycle(f.year.as_ref(), &options));
  }

  pub fn clear_filter(&mut self) {
    self.search_active = false;
    self.set_filter(|f| *f = WorkerFilter::default());
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if let Screen::ConfirmDelete { id, name } = &self.screen {
      let (id, name) = (id.clone(), name.clone());
      self.handle_confirm_key(key, &id, &name).await;
      return Ok(true);
    }

    if self.search_active {
      self.handle_search_key(key);
      return Ok(true);
    }

    self.handle_list_key(key).await
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.set_filter(|f| f.search = None);
      }
      KeyCode::Enter => self.search_active = false,
      KeyCode::Backspace => self.set_filter(|f| {
        if let Some(s) = f.search.as_mut() {
          s.pop();
        }
        if f.search.as_deref() == Some("") {
          f.search = None;
        }
      }),
      KeyCode::Char(c) => {
        self.set_filter(|f| f.search.get_or_insert_with(String::new).push(c))
      }
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.view.records.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('/') => self.search_active = true,
      KeyCode::Char('t') => self.cycle_worker_type(),
      KeyCode::Char('p') => self.cycle_payment_kind(),
      KeyCode::Char('s') => self.cycle_sector(),
      KeyCode::Char('y') => self.cycle_year(),
      KeyCode::Char('c') => self.clear_filter(),

      KeyCode::Char('r') => {
        // A failed reload keeps the previous list; the error is in the status bar.
        let _ = self.load().await;
      }

      KeyCode::Char('d') => {
        if let Some(r) = self.cursor_record() {
          self.screen = Screen::ConfirmDelete {
            id:   r.id.clone(),
            name: r.full_name.clone(),
          };
        }
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent, id: &str, name: &str) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        self.screen = Screen::List;
        self.status_msg = match self.client.delete_worker(id).await {
          Ok(DeleteOutcome::Deleted) => {
            let remaining = self.records.iter().filter(|r| r.id != id).cloned().collect();
            self.set_records(remaining);
            format!("{name} excluído.")
          }
          Ok(DeleteOutcome::NotFound) => format!("{name} já não existe."),
          Ok(DeleteOutcome::Forbidden) => "Sem permissão para excluir.".into(),
          Ok(DeleteOutcome::Declined) => "Exclusão cancelada.".into(),
          Err(e) => format!("Erro: {e}"),
        };
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        self.screen = Screen::List;
        self.status_msg = "Exclusão cancelada.".into();
      }
      _ => {}
    }
  }
}
