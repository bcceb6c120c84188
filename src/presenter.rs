//! Presentation collaborator.
//!
//! The service turns every request into a [`Reply`]. A presenter delivers it
//! to the chat platform, including any [`Control`]s; pressing a control sends
//! its [`Command`] back as a new request from whoever pressed it.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use async_trait::async_trait;
use thiserror::Error;

use crate::card::Card;
use crate::record::UserId;
use crate::service::Command;

/// Card layout for a table image: dealer row above, player row below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Dealer cards, hole card face down until revealed.
    pub dealer: Vec<Card>,
    /// Player cards.
    pub player: Vec<Card>,
}

/// A button offered with a render.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    /// Button label.
    pub label: String,
    /// Request issued when pressed.
    pub command: Command,
}

/// A public message.
#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    /// Title line.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Cards to composite into an image, if any.
    pub table: Option<TableView>,
    /// Available actions; empty when nothing is pending.
    pub controls: Vec<Control>,
}

impl Render {
    /// A render with no image and no controls.
    pub fn text(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            table: None,
            controls: Vec::new(),
        }
    }

    /// Attaches a table image.
    #[must_use]
    pub fn with_table(mut self, table: TableView) -> Self {
        self.table = Some(table);
        self
    }

    /// Adds a control.
    #[must_use]
    pub fn with_control(mut self, label: impl Into<String>, command: Command) -> Self {
        self.controls.push(Control {
            label: label.into(),
            command,
        });
        self
    }
}

/// What to send back for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Visible to the channel.
    Public(Render),
    /// Visible only to the requester.
    Ephemeral(String),
}

/// Delivery failure reported by a presenter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("presentation failed: {0}")]
pub struct PresentError(pub String);

/// Delivers replies and operator reports.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Sends `reply` in answer to a request from `to`.
    async fn send(&self, to: UserId, reply: Reply) -> Result<(), PresentError>;

    /// Posts a failure report to the operator channel.
    async fn report_failure(&self, report: &str) -> Result<(), PresentError>;
}
