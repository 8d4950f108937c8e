use log::{info, warn};
use wire::Reply;

use crate::{errors::GradeError, roster::Roster, types::Digest};

pub fn handle_grades(digest: &Digest, roster: &Roster) -> Result<Reply, GradeError> {
    info!("Received ID/password hash {} from client", hex::encode(digest));

    match roster.authenticate(digest) {
        Some(student) => {
            info!("Correct password, record found for {}", student.id);
            Ok(Reply::ok(student.grades_json()?))
        }
        None => {
            warn!("Password failure");
            Err(GradeError::AuthFailed)
        }
    }
}
