/// Blocking alert surface for failed user actions (upload, decision)
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Prints alerts to stderr, leaving stdout to rendered screens
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("! {}", message);
    }
}
