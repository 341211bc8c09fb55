//! mtlab-report — HTML output for lab runs and the class overview.

pub mod html;
pub mod overview;

pub use html::{generate_lab_html, generate_overview_html, write_html_report, write_lab_html};
pub use overview::{build_overview, ClassOverview, RecentSubmission, StudentSummary};
