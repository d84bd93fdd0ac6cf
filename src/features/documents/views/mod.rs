mod detail_view;
mod list_view;
mod notifier;
mod status_poller;

pub use detail_view::{workflow_line, DocumentDetailView};
pub use list_view::DocumentListView;
pub use notifier::{Notifier, StderrNotifier};
pub use status_poller::StatusPoller;
