pub(crate) mod mailer;
pub(crate) mod read_cache;
pub(crate) mod reconcile;
pub(crate) mod scoring;
pub(crate) mod session_store;
