pub(crate) mod answers;
pub(crate) mod categories;
pub(crate) mod category_scores;
pub(crate) mod companies;
pub(crate) mod invitations;
pub(crate) mod presentations;
pub(crate) mod progress;
pub(crate) mod questions;
pub(crate) mod shares;
pub(crate) mod summaries;
pub(crate) mod test_attempts;
pub(crate) mod users;
