//! Authorization and confirmation seams for destructive actions.
//!
//! Authentication itself lives outside this crate; hosts hand in something
//! implementing [`Authorizer`] (usually a [`Principal`]) and a [`Confirm`]
//! primitive.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Answers "who is acting" and "what may they do".
pub trait Authorizer {
  /// Identifier of the acting user, if authenticated.
  fn actor_id(&self) -> Option<&str>;
  fn is_admin(&self) -> bool;
  fn can_delete(&self) -> bool;
}

/// A blocking yes/no prompt.
pub trait Confirm {
  fn confirm(&self, prompt: &str) -> bool;
}

/// A pre-answered prompt, e.g. a `confirm=true` query flag.
impl Confirm for bool {
  fn confirm(&self, _prompt: &str) -> bool { *self }
}

/// An authenticated (or anonymous) user and their rights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub username:   Option<String>,
  #[serde(default)]
  pub admin:      bool,
  #[serde(default)]
  pub can_delete: bool,
}

impl Principal {
  /// No identity, no rights.
  pub fn anonymous() -> Self { Self::default() }

  pub fn user(username: impl Into<String>) -> Self {
    Self {
      username: Some(username.into()),
      ..Self::default()
    }
  }
}

impl Authorizer for Principal {
  fn actor_id(&self) -> Option<&str> { self.username.as_deref() }

  fn is_admin(&self) -> bool { self.admin }

  /// Admins may always delete.
  fn can_delete(&self) -> bool { self.admin || self.can_delete }
}

/// Result of [`guarded_delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
  Deleted,
  NotFound,
  /// The confirmation prompt was answered "no".
  Declined,
  /// The actor lacks delete rights; nothing was asked.
  Forbidden,
}

/// Run `delete` only when `authorizer` allows it and `confirm` agrees.
///
/// `delete` is an unpolled future (e.g. `store.delete_worker(id)`) resolving
/// to whether a record was removed; it is dropped without running when the
/// checks fail.
pub async fn guarded_delete<A, C, F, E>(
  authorizer: &A,
  confirm: &C,
  prompt: &str,
  delete: F,
) -> Result<DeleteOutcome, E>
where
  A: Authorizer + ?Sized,
  C: Confirm + ?Sized,
  F: Future<Output = Result<bool, E>>,
{
  if !authorizer.can_delete() {
    return Ok(DeleteOutcome::Forbidden);
  }
  if !confirm.confirm(prompt) {
    return Ok(DeleteOutcome::Declined);
  }
  Ok(if delete.await? {
    DeleteOutcome::Deleted
  } else {
    DeleteOutcome::NotFound
  })
}

#[cfg(test)]
mod tests {
  use std::{
    cell::Cell,
    convert::Infallible,
  };

  use super::*;

  struct Counting<'a>(&'a Cell<u32>, bool);

  impl Confirm for Counting<'_> {
    fn confirm(&self, _prompt: &str) -> bool {
      self.0.set(self.0.get() + 1);
      self.1
    }
  }

  #[tokio::test]
  async fn forbidden_actor_is_never_prompted() {
    let asked = Cell::new(0);
    let ran = Cell::new(false);
    let outcome = guarded_delete(
      &Principal::user("visitante"),
      &Counting(&asked, true),
      "Excluir?",
      async {
        ran.set(true);
        Ok::<_, Infallible>(true)
      },
    )
    .await
    .unwrap();
    assert_eq!(outcome, DeleteOutcome::Forbidden);
    assert_eq!(asked.get(), 0);
    assert!(!ran.get());
  }

  #[tokio::test]
  async fn declined_prompt_skips_delete() {
    let admin = Principal {
      username: Some("admin".into()),
      admin: true,
      can_delete: false,
    };
    let ran = Cell::new(false);
    let outcome = guarded_delete(&admin, &false, "Excluir?", async {
      ran.set(true);
      Ok::<_, Infallible>(true)
    })
    .await
    .unwrap();
    assert_eq!(outcome, DeleteOutcome::Declined);
    assert!(!ran.get());
  }

  #[tokio::test]
  async fn confirmed_delete_reports_result() {
    let mut editor = Principal::user("secretaria");
    editor.can_delete = true;
    assert!(!editor.is_admin());

    let deleted = guarded_delete(&editor, &true, "Excluir?", async {
      Ok::<_, Infallible>(true)
    })
    .await
    .unwrap();
    assert_eq!(deleted, DeleteOutcome::Deleted);

    let missing = guarded_delete(&editor, &true, "Excluir?", async {
      Ok::<_, Infallible>(false)
    })
    .await
    .unwrap();
    assert_eq!(missing, DeleteOutcome::NotFound);
  }

  #[test]
  fn anonymous_has_no_identity() {
    let p = Principal::anonymous();
    assert_eq!(p.actor_id(), None);
    assert!(!p.can_delete());
  }
}
