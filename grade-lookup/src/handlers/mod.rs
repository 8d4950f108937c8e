mod average;
mod grades;

pub use average::handle_average;
pub use grades::handle_grades;

use wire::{Reply, Request};

use crate::{message::GradeRequest, roster::Roster};

/// Decodes one request envelope and answers it. Failures become in-band replies.
pub fn handle_request(request: Request, roster: &Roster) -> Reply {
    let outcome = GradeRequest::try_from(request).and_then(|request| match request {
        GradeRequest::Average(code) => handle_average(code, roster),
        GradeRequest::Grades(digest) => handle_grades(&digest, roster),
    });

    outcome.unwrap_or_else(Reply::from)
}
